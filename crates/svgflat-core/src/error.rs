pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    #[error(transparent)]
    Geometry(#[from] svgflat_geom::Error),

    #[error("No <svg> tags found")]
    MissingSvgRoot,

    #[error("Multiple <svg> tags are not supported")]
    MultipleSvgRoots,

    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("Conversion failed:\n{message}")]
    Conversion { message: String },
}
