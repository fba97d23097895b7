/// Text layout helpers for console output
pub mod text {
    /// Re-flow each paragraph of `text` so no line exceeds `width` characters.
    /// Words longer than `width` are left on their own line unbroken.
    pub fn fill(text: &str, width: usize) -> String {
        text.lines()
            .map(|line| fill_paragraph(line, width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn fill_paragraph(line: &str, width: usize) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();

        for word in line.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };

            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines.join("\n")
    }

    /// `value`, or `placeholder` when it is blank.
    pub fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
        if value.trim().is_empty() {
            placeholder
        } else {
            value
        }
    }
}
