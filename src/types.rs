use std::collections::HashMap;

/// Identifier for a data source, derived from its origin name.
/// Examples: `Furfsky Reborn`, `CalamityMod`, `minecraft`
pub type SourceId = String;
/// Flat label mapping parsed from an image's sibling label file.
/// Example: `{"name": "Amber Material", "rarity": "rare"}`
pub type LabelMap = HashMap<String, String>;
/// Name of an external decompiler tool, used in error reports.
/// Examples: `vineflower`, `ilspycmd`, `unzip`
pub type ToolName = String;
/// File extension without the leading dot, compared case-insensitively.
/// Examples: `png`, `json`, `xnb`
pub type Extension = String;
