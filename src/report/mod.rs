pub mod json;
pub mod md;

use crate::board::Board;
use crate::error::RankboardError;
use crate::types::config::Grouping;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
    Compact,
}

pub fn render(
    board: &Board,
    format: OutputFormat,
    grouping: Grouping,
) -> Result<String, RankboardError> {
    match format {
        OutputFormat::Json => json::to_json(&board.results()).map_err(RankboardError::Json),
        OutputFormat::Md => Ok(md::to_markdown(board, grouping)),
        OutputFormat::Compact => json::to_json(&board.get_state()).map_err(RankboardError::Json),
    }
}
