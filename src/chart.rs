//! Textual line chart used to show a payment forecast in the terminal.

const LABEL_WIDTH: usize = 12;

/// Plots `series` on a `width` x `height` character grid. The first
/// `observed` points are drawn with `*` and the rest with `+`.
pub fn render(series: &[f64], observed: usize, width: usize, height: usize) -> String {
    if series.is_empty() || width == 0 || height == 0 {
        return String::new();
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let last = series.len() - 1;

    let mut grid = vec![vec![' '; width]; height];
    for (i, &value) in series.iter().enumerate() {
        let col = if last == 0 { 0 } else { i * (width - 1) / last };
        let level = if max > min {
            (((value - min) / (max - min)) * (height - 1) as f64).round() as usize
        } else {
            height / 2
        };
        let row = height - 1 - level.min(height - 1);
        grid[row][col] = if i < observed { '*' } else { '+' };
    }

    let mut out = String::new();
    for (r, line) in grid.iter().enumerate() {
        let label = if r == 0 {
            format!("{:>w$.2}", max, w = LABEL_WIDTH)
        } else if r == height - 1 {
            format!("{:>w$.2}", min, w = LABEL_WIDTH)
        } else {
            " ".repeat(LABEL_WIDTH)
        };
        let points: String = line.iter().collect();
        out.push_str(&label);
        out.push_str(" |");
        out.push_str(points.trim_end());
        out.push('\n');
    }
    out.push_str(&" ".repeat(LABEL_WIDTH + 1));
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push('\n');
    out
}
