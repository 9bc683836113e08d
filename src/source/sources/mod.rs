/// Minecraft releases and `.jar` mods.
pub mod minecraft;
/// Banned-identity sentinel.
pub mod null;
/// Folders already present under the image output root.
pub mod preexisting;
/// Terraria installs and `.tmod` mods.
pub mod terraria;
/// Plain `.zip` asset archives.
pub mod zip;
