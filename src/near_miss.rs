//! Closest-candidate lookup for a required block that did not match.
//!
//! A block that drifted by a character or two is reported with the line it
//! starts on and how similar it is, so the person running the patcher can see
//! what changed instead of only learning that nothing matched.

use std::fmt;
use strsim::normalized_levenshtein;

/// Candidates below this similarity are not worth reporting.
pub const MIN_SIMILARITY: f64 = 0.6;

/// Region of the content most similar to a block that was not found.
#[derive(Debug, Clone, PartialEq)]
pub struct NearMiss {
    /// 1-based line where the candidate starts
    pub line: usize,
    /// Normalized Levenshtein similarity in [0, 1]
    pub similarity: f64,
    /// The candidate text itself
    pub text: String,
}

impl fmt::Display for NearMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "closest candidate at line {} ({:.0}% similar)",
            self.line,
            self.similarity * 100.0
        )
    }
}

/// At most this many windows get the full block comparison.
const MAX_CANDIDATES: usize = 16;

/// Find the window as tall as `needle` that is most similar to it, if it
/// clears [`MIN_SIMILARITY`].
///
/// Windows are ranked first by how well their first and last lines match the
/// needle's, which is two short comparisons per line. A window needs one of
/// the two to clear [`MIN_SIMILARITY`], and only the best [`MAX_CANDIDATES`]
/// are compared in full, so the cost stays linear in the size of the file.
pub fn find_near_miss(content: &str, needle: &str) -> Option<NearMiss> {
    let needle_lines: Vec<&str> = needle.lines().collect();
    let height = needle_lines.len();
    if height == 0 {
        return None;
    }

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < height {
        return None;
    }

    let first = needle_lines[0].trim();
    let last = needle_lines[height - 1].trim();

    let mut candidates: Vec<(f64, usize)> = (0..=(lines.len() - height))
        .map(|start| {
            let head = normalized_levenshtein(lines[start].trim(), first);
            let tail = normalized_levenshtein(lines[start + height - 1].trim(), last);
            (head, tail, start)
        })
        .filter(|(head, tail, _)| head.max(*tail) >= MIN_SIMILARITY)
        .map(|(head, tail, start)| (head + tail, start))
        .collect();
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    candidates.truncate(MAX_CANDIDATES);

    let mut best: Option<NearMiss> = None;
    for (_, start) in candidates {
        let window = lines[start..start + height].join("\n");
        let similarity = normalized_levenshtein(&window, needle);
        if best.as_ref().map_or(true, |b| similarity > b.similarity) {
            best = Some(NearMiss {
                line: start + 1,
                similarity,
                text: window,
            });
        }
    }

    best.filter(|b| b.similarity >= MIN_SIMILARITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_block_with_one_changed_char() {
        let content = "header\n<label>\n  <input value={x} />\n</label>\nfooter\n";
        let needle = "<label>\n  <input value={y} />\n</label>";

        let hit = find_near_miss(content, needle).expect("near miss");
        assert_eq!(hit.line, 2);
        assert!(hit.similarity > 0.9);
        assert!(hit.text.contains("value={x}"));
    }

    #[test]
    fn test_unrelated_content_has_no_candidate() {
        let content = "fn main() {}\n";
        assert!(find_near_miss(content, "<label>completely different</label>").is_none());
    }

    #[test]
    fn test_content_shorter_than_needle() {
        assert!(find_near_miss("one line", "two\nlines").is_none());
    }

    #[test]
    fn test_finds_block_whose_first_line_drifted() {
        let content = "a\n<header id=\"top\">\n  <input value={searchCardId} onKeyDown={handleKeyDown} />\n</header>\nb\n";
        let needle = "<nav>\n  <input value={searchCardId} onKeyDown={handleKeyDown} />\n</header>";

        let hit = find_near_miss(content, needle).expect("near miss");
        assert_eq!(hit.line, 2);
    }

    #[test]
    fn test_large_file_scan_is_bounded() {
        let needle = "<label>\n  <input value={y} />\n</label>";
        let mut content = String::new();
        // More lookalike openers than get compared in full, all ahead of the block
        for _ in 0..200 {
            content.push_str("<label>\n  unrelated\n</span>\n");
        }
        for i in 0..20_000 {
            content.push_str(&format!("const filler{i} = {i};\n"));
        }
        content.push_str("<label>\n  <input value={x} />\n</label>\n");

        let hit = find_near_miss(&content, needle).expect("near miss");
        assert_eq!(hit.line, 20_601);
        assert!(hit.similarity > 0.9);
    }

    #[test]
    fn test_display() {
        let hit = NearMiss {
            line: 12,
            similarity: 0.974,
            text: String::new(),
        };
        assert_eq!(hit.to_string(), "closest candidate at line 12 (97% similar)");
    }
}
