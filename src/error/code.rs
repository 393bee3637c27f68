/// Error codes with category prefix
///
/// Categories:
/// - KEY: Resource key resolution errors
/// - PRT: Porter registry errors
/// - PKG: Mod package lookups and registration
/// - ARC: Finished-import archiving
/// - CFG: Config / settings parsing
/// - IO: File system operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Key errors (KEY001-KEY099)
    /// Reserved separator used inside a name
    Key001,
    /// Resource name could not be resolved
    Key002,
    /// Reserved resource name
    Key003,

    // Porter errors (PRT001-PRT099)
    /// No porter for the requested type
    Prt001,
    /// Invalid type hierarchy declaration
    Prt002,

    // Package errors (PKG001-PKG099)
    /// Mod package not found
    Pkg001,
    /// Resource not found
    Pkg002,
    /// Duplicate resource
    Pkg003,
    /// Plugin load failure
    Pkg004,

    // Archive errors (ARC001-ARC099)
    /// Protected folder deletion attempted
    Arc001,

    // Config errors (CFG001-CFG099)
    /// Invalid config format
    Cfg001,
    /// Invalid settings
    Cfg002,

    // I/O errors (IO001-IO099)
    /// File not found
    Io001,
    /// Permission denied
    Io002,
    /// Other I/O failure
    Io003,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "KEY001")
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Key001 => "KEY001",
            ErrorCode::Key002 => "KEY002",
            ErrorCode::Key003 => "KEY003",
            ErrorCode::Prt001 => "PRT001",
            ErrorCode::Prt002 => "PRT002",
            ErrorCode::Pkg001 => "PKG001",
            ErrorCode::Pkg002 => "PKG002",
            ErrorCode::Pkg003 => "PKG003",
            ErrorCode::Pkg004 => "PKG004",
            ErrorCode::Arc001 => "ARC001",
            ErrorCode::Cfg001 => "CFG001",
            ErrorCode::Cfg002 => "CFG002",
            ErrorCode::Io001 => "IO001",
            ErrorCode::Io002 => "IO002",
            ErrorCode::Io003 => "IO003",
        }
    }

    /// Returns remediation hint shown by the CLI
    pub fn remediation(&self) -> &'static str {
        match self {
            ErrorCode::Key001 => "Remove '::' from the package or resource name",
            ErrorCode::Key002 => "Add a 'name' property to the _config.json, or pass --name",
            ErrorCode::Key003 => "Provide a resource name under the 'name' property in the config",
            ErrorCode::Prt001 => "Register a porter for the type or one of its ancestors in modport.toml",
            ErrorCode::Prt002 => "Check [[types]] in modport.toml for duplicates or cycles",
            ErrorCode::Pkg001 => "Import the package first, or check the package name",
            ErrorCode::Pkg002 => "Check the resource key and type",
            ErrorCode::Pkg003 => "The resource is already registered; unload it before re-adding",
            ErrorCode::Pkg004 => "Check the files in the package's plugins folder",
            ErrorCode::Arc001 => "Already moved files were left in place; finish the cleanup manually",
            ErrorCode::Cfg001 => "Check the JSON syntax of the config file",
            ErrorCode::Cfg002 => "Check the syntax of modport.toml",
            ErrorCode::Io001 => "Verify the path exists",
            ErrorCode::Io002 => "Check file and directory permissions",
            ErrorCode::Io003 => "Retry the operation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 15] = [
        ErrorCode::Key001,
        ErrorCode::Key002,
        ErrorCode::Key003,
        ErrorCode::Prt001,
        ErrorCode::Prt002,
        ErrorCode::Pkg001,
        ErrorCode::Pkg002,
        ErrorCode::Pkg003,
        ErrorCode::Pkg004,
        ErrorCode::Arc001,
        ErrorCode::Cfg001,
        ErrorCode::Cfg002,
        ErrorCode::Io001,
        ErrorCode::Io002,
        ErrorCode::Io003,
    ];

    #[test]
    fn all_error_codes_have_valid_string() {
        for code in ALL {
            let s = code.as_str();
            assert!(
                s.len() >= 5 && s.len() <= 6,
                "Error code string should be 5-6 characters: {}",
                s
            );
        }
    }

    #[test]
    fn all_error_codes_have_remediation() {
        for code in ALL {
            assert!(
                !code.remediation().is_empty(),
                "Remediation should not be empty for {:?}",
                code
            );
        }
    }
}
