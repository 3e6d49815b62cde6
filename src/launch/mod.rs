mod arguments;
mod classpath;
mod command;

pub use arguments::{
    feature_set, materialize_arguments, substitute, Identity, LaunchParameters, MemorySettings,
    PlaceholderContext, QuickPlay, WindowSettings,
};
pub use classpath::{build_classpath, classpath_separator};
pub use command::{generate_command, launch, LaunchCommand, LaunchedGame};
