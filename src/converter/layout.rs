//! Table detection from positioned text.
//!
//! Fragments are grouped into lines by baseline, and runs of consecutive
//! multi-fragment lines become tables. Columns are clusters of fragment
//! x-positions over the whole run, so a row with a missing cell still lines up
//! with its neighbours.

/// Vertical distance (in points) within which fragments share a line.
const LINE_TOLERANCE: f32 = 3.0;
/// Horizontal distance (in points) chaining x-positions into one column.
const COLUMN_TOLERANCE: f32 = 8.0;
const MIN_TABLE_ROWS: usize = 2;
const MIN_TABLE_COLUMNS: usize = 2;

/// A run of text at a position in page space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl TextFragment {
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

/// Rows of cells, top to bottom.
pub type Table = Vec<Vec<String>>;

/// Tables on one page, top to bottom.
pub fn detect_tables(fragments: Vec<TextFragment>) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<TextFragment>> = Vec::new();

    for line in group_lines(fragments) {
        if line.len() >= MIN_TABLE_COLUMNS {
            run.push(line);
        } else {
            flush_run(&mut run, &mut tables);
        }
    }
    flush_run(&mut run, &mut tables);

    tables
}

fn flush_run(run: &mut Vec<Vec<TextFragment>>, tables: &mut Vec<Table>) {
    let lines = std::mem::take(run);
    if lines.len() >= MIN_TABLE_ROWS {
        tables.push(align_columns(lines));
    }
}

/// Lines ordered top to bottom, fragments within a line left to right.
fn group_lines(mut fragments: Vec<TextFragment>) -> Vec<Vec<TextFragment>> {
    fragments.retain(|f| !f.text.trim().is_empty());
    fragments.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<TextFragment>> = Vec::new();
    let mut baseline = f32::NAN;
    for fragment in fragments {
        if let Some(line) = lines.last_mut()
            && (baseline - fragment.y).abs() <= LINE_TOLERANCE
        {
            line.push(fragment);
            continue;
        }
        baseline = fragment.y;
        lines.push(vec![fragment]);
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Left edge of each column cluster, ascending.
fn column_anchors(lines: &[Vec<TextFragment>]) -> Vec<f32> {
    let mut xs: Vec<f32> = lines.iter().flatten().map(|f| f.x).collect();
    xs.sort_by(f32::total_cmp);

    let mut anchors = Vec::new();
    let mut previous = f32::NEG_INFINITY;
    for x in xs {
        if x - previous > COLUMN_TOLERANCE {
            anchors.push(x);
        }
        previous = x;
    }
    anchors
}

fn align_columns(lines: Vec<Vec<TextFragment>>) -> Table {
    let anchors = column_anchors(&lines);

    lines
        .into_iter()
        .map(|line| {
            let mut cells = vec![String::new(); anchors.len()];
            for fragment in line {
                let column = anchors
                    .partition_point(|anchor| *anchor <= fragment.x)
                    .saturating_sub(1);
                let cell = &mut cells[column];
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(fragment.text.trim());
            }
            cells
        })
        .collect()
}
