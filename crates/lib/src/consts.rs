/// Default folder (relative to the project root) that receives built binaries and the manifest.
pub const DEFAULT_BIN_FOLDER: &str = "bin";

/// Default file extension of the engine manifest.
pub const DEFAULT_MANIFEST_EXTENSION: &str = "gdextension";

/// Base name of the runtime binding library every driver links against.
pub const DEFAULT_BINDING_LIBRARY: &str = "SwiftGodot";

/// Entry symbol exported by the driver library.
pub const DEFAULT_ENTRY_SYMBOL: &str = "swift_entry_point";

/// Oldest engine version the generated manifest declares compatibility with.
pub const DEFAULT_COMPATIBILITY_MINIMUM: f64 = 4.2;

/// Name of the archive produced by the iOS archiving step, relative to the driver package.
pub const XCARCHIVE_NAME: &str = "xcodebuild.xcarchive";
