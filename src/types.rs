use crate::pipeline::ObjectNaming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How uploaded objects are named under the configured prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum NamingPolicy {
    /// Keep the picked file's display name.
    #[value(name = "original")]
    Original,
    /// Generate a fresh UUID, keeping the file extension.
    #[value(name = "random")]
    Random,
}

impl From<NamingPolicy> for ObjectNaming {
    fn from(p: NamingPolicy) -> Self {
        match p {
            NamingPolicy::Original => ObjectNaming::Original,
            NamingPolicy::Random => ObjectNaming::Random,
        }
    }
}
