/// Difficulty option understood by Stockfish-family engines (0-20)
pub const SKILL_LEVEL: &str = "Skill Level";
/// Rule-set selector understood by Fairy-Stockfish
pub const UCI_VARIANT: &str = "UCI_Variant";
/// Path to a Fairy-Stockfish variant definition file
pub const VARIANT_PATH: &str = "VariantPath";

pub const MIN_SKILL_LEVEL: u8 = 0;
pub const MAX_SKILL_LEVEL: u8 = 20;

/// `setoption name <name> [value <value>]`
#[must_use]
pub fn format_setoption(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("setoption name {name} value {value}"),
        None => format!("setoption name {name}"),
    }
}
