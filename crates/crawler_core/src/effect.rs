#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRun(RunParams),
    RequestStop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    pub urls: Vec<String>,
    pub output_dir: String,
    pub max_concurrent: u8,
}
