use crate::models::Circle;
use crate::params::ParameterSet;

/// One-line summary of a detection cycle
pub fn summary_line(circles: &[Circle]) -> String {
    match circles.len() {
        0 => "No circles detected".to_string(),
        1 => "Found 1 circle".to_string(),
        n => format!("Found {} circles", n),
    }
}

/// Per-circle lines, numbered from 1
pub fn circle_lines(circles: &[Circle]) -> Vec<String> {
    circles
        .iter()
        .enumerate()
        .map(|(i, c)| format!("  Circle {}: center=({}, {}), radius={}", i + 1, c.x, c.y, c.radius))
        .collect()
}

/// Print the summary, and each circle when `verbose`
pub fn print_circles(circles: &[Circle], verbose: bool) {
    println!("{}", summary_line(circles));
    if verbose {
        for line in circle_lines(circles) {
            println!("{}", line);
        }
    }
}

/// Current slider positions, e.g. `Parameters: dp x10=10 minDist=50 ...`
pub fn parameters_line(values: &ParameterSet) -> String {
    format!("Parameters: {}", values)
}
