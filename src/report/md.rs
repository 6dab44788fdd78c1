use crate::board::Board;
use crate::types::config::Grouping;
use crate::types::model::{Bucket, Question};

const UNGROUPED: &str = "Ungrouped";

pub fn to_markdown(board: &Board, grouping: Grouping) -> String {
    let mut output = String::new();
    output.push_str("# Rank Board\n\n");

    for (title, rows) in sections(board.questions(), grouping) {
        if let Some(title) = title {
            output.push_str(&format!("## {}\n\n", escape(&title)));
        }
        push_table(&mut output, board, &rows);
        output.push('\n');
    }

    let placed = board
        .results()
        .iter()
        .filter(|record| record.rank.is_some())
        .count();
    output.push_str(&format!(
        "Placed: {} of {} judgments\n",
        placed,
        board.questions().len() * board.items().len()
    ));
    output
}

fn section_title(question: &Question, grouping: Grouping) -> Option<String> {
    match grouping {
        Grouping::None => None,
        Grouping::Domain => Some(question.domain.as_deref().unwrap_or(UNGROUPED).to_string()),
        Grouping::Subdomain => Some(match (&question.domain, &question.subdomain) {
            (Some(domain), Some(subdomain)) => format!("{domain} / {subdomain}"),
            (Some(domain), None) => domain.clone(),
            (None, Some(subdomain)) => subdomain.clone(),
            (None, None) => UNGROUPED.to_string(),
        }),
    }
}

/// Groups question indexes by section title, in order of first appearance.
fn sections(questions: &[Question], grouping: Grouping) -> Vec<(Option<String>, Vec<usize>)> {
    let mut out: Vec<(Option<String>, Vec<usize>)> = Vec::new();
    for (index, question) in questions.iter().enumerate() {
        let title = section_title(question, grouping);
        match out.iter_mut().find(|(existing, _)| *existing == title) {
            Some((_, rows)) => rows.push(index),
            None => out.push((title, vec![index])),
        }
    }
    out
}

fn push_table(output: &mut String, board: &Board, rows: &[usize]) {
    let scale = board.scale();
    output.push_str("| Question | Unsorted |");
    for bucket in scale.buckets() {
        output.push_str(&format!(" {} |", escape(&bucket.label)));
    }
    output.push('\n');
    output.push_str("|---|---|");
    for _ in scale.buckets() {
        output.push_str("---|");
    }
    output.push('\n');

    for &row in rows {
        let question = &board.questions()[row];
        output.push_str(&format!("| {} |", escape(&question.text)));
        let buckets = std::iter::once(Bucket::Unsorted).chain((0..scale.len()).map(Bucket::Scale));
        for bucket in buckets {
            let cell = board
                .bucket_items(row, bucket)
                .iter()
                .map(|item| match board.rank_of(row, &item.key) {
                    Some(rank) => format!("{} (#{rank})", escape(&item.name)),
                    None => escape(&item.name),
                })
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!(" {cell} |"));
        }
        output.push('\n');
    }
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}
