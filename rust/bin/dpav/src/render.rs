//! Plain-text tables with search-term highlighting.

use std::io::IsTerminal;

use dpav_admin::highlight;

const MARK_ON: &str = "\x1b[1;33m";
const MARK_OFF: &str = "\x1b[0m";

pub struct Table<'a> {
    pub headers: &'a [&'a str],
    pub rows: Vec<Vec<String>>,
    /// Columns where matches of `term` are highlighted.
    pub searchable: &'a [usize],
    pub term: &'a str,
}

impl Table<'_> {
    pub fn print(&self) {
        print!("{}", self.render(std::io::stdout().is_terminal()));
    }

    /// Render with two-space gutters. Matches are wrapped in ANSI bold when
    /// `color` is set, left as is otherwise.
    pub fn render(&self, color: bool) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        push_line(&mut out, &header, &widths, |_, text| text.to_string());
        for row in &self.rows {
            push_line(&mut out, row, &widths, |col, text| {
                if color && self.searchable.contains(&col) {
                    marked(text, self.term)
                } else {
                    text.to_string()
                }
            });
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize], style: impl Fn(usize, &str) -> String) {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        out.push_str(&style(i, cell));
        if i < last {
            let pad = widths.get(i).copied().unwrap_or(0) - cell.chars().count();
            out.push_str(&" ".repeat(pad + 2));
        }
    }
    out.push('\n');
}

fn marked(text: &str, term: &str) -> String {
    highlight(text, term)
        .into_iter()
        .map(|seg| {
            if seg.matched {
                format!("{}{}{}", MARK_ON, seg.text, MARK_OFF)
            } else {
                seg.text
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(term: &'a str) -> Table<'a> {
        Table {
            headers: &["ID", "NOMBRE", "RAZA"],
            rows: vec![
                vec!["2".into(), "Rocky".into(), "Beagle".into()],
                vec!["11".into(), "Luna".into(), "Labrador".into()],
            ],
            searchable: &[1, 2],
            term,
        }
    }

    #[test]
    fn columns_align_on_char_width() {
        let out = sample("").render(false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID  NOMBRE  RAZA");
        assert_eq!(lines[1], "2   Rocky   Beagle");
        assert_eq!(lines[2], "11  Luna    Labrador");
    }

    #[test]
    fn matches_are_marked_only_in_color_mode() {
        let plain = sample("lab").render(false);
        assert!(!plain.contains('\x1b'));

        let colored = sample("lab").render(true);
        assert!(colored.contains(&format!("{}Lab{}rador", MARK_ON, MARK_OFF)));
        // The id column is not searchable.
        assert!(!colored.contains(&format!("{}1", MARK_ON)));
    }

    #[test]
    fn accented_headers_pad_by_chars() {
        let table = Table {
            headers: &["TAMAÑO", "SEXO"],
            rows: vec![vec!["Pequeño".into(), "Hembra".into()]],
            searchable: &[],
            term: "",
        };
        let out = table.render(false);
        assert_eq!(out.lines().next(), Some("TAMAÑO   SEXO"));
    }
}
