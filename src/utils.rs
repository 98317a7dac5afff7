use macroquad::prelude::*;

pub fn string_to_color(color_str: &str) -> Color {
    match color_str {
        "PINK" => PINK,
        "RED" => RED,
        "ORANGE" => ORANGE,
        "YELLOW" => YELLOW,
        "GREEN" => GREEN,
        "BLUE" => BLUE,
        "PURPLE" => VIOLET, // USING VIOLET AS A CLOSE APPROXIMATION
        _ => WHITE, // Default to WHITE
    }
}

/// Parses a resolution string such as `640x360`.
pub fn parse_resolution(resolution_str: &str) -> Option<(i32, i32)> {
    let (w_str, h_str) = resolution_str.split_once('x')?;
    let w = w_str.trim().parse::<i32>().ok()?;
    let h = h_str.trim().parse::<i32>().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

/// Breaks text into lines of at most `max_chars` characters, on word boundaries where possible.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { 0 } else { 1 } + word.chars().count();
        if !line.is_empty() && line.chars().count() + needed > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolutions_parse() {
        assert_eq!(parse_resolution("640x360"), Some((640, 360)));
        assert_eq!(parse_resolution("1280 x 720"), Some((1280, 720)));
        assert_eq!(parse_resolution("wide"), None);
        assert_eq!(parse_resolution("0x360"), None);
    }

    #[test]
    fn wrapping_keeps_words_whole() {
        let lines = wrap_text("Night races through neon streets", 12);
        assert_eq!(lines, vec!["Night races", "through neon", "streets"]);
    }
}
