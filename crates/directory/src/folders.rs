//! Well-known Windows Installer system folder properties.
//!
//! The installer resolves these at install time, so a `Directory` row for one
//! is just the property name under the root with a `DefaultDir` of `.`.

use crate::models::same_name;

pub const SYSTEM_FOLDERS: &[&str] = &[
    "AdminToolsFolder",
    "AppDataFolder",
    "CommonAppDataFolder",
    "CommonFiles64Folder",
    "CommonFilesFolder",
    "DesktopFolder",
    "FavoritesFolder",
    "FontsFolder",
    "LocalAppDataFolder",
    "MyPicturesFolder",
    "NetHoodFolder",
    "PersonalFolder",
    "PrintHoodFolder",
    "ProgramFiles64Folder",
    "ProgramFilesFolder",
    "ProgramMenuFolder",
    "RecentFolder",
    "SendToFolder",
    "StartMenuFolder",
    "StartupFolder",
    "System16Folder",
    "System64Folder",
    "SystemFolder",
    "TempFolder",
    "TemplateFolder",
    "WindowsFolder",
    "WindowsVolume",
];

/// Returns the canonical spelling of a system folder name, matched case-insensitively.
///
/// ```
/// use msikit_directory::folders::lookup;
/// assert_eq!(lookup("programfilesfolder"), Some("ProgramFilesFolder"));
/// assert_eq!(lookup("MyApp"), None);
/// ```
pub fn lookup(name: &str) -> Option<&'static str> {
    SYSTEM_FOLDERS.iter().copied().find(|folder| same_name(folder, name))
}

/// Returns `true` for the exact identifier of a system folder.
pub fn is_system_folder(id: &str) -> bool {
    SYSTEM_FOLDERS.contains(&id)
}
