//! Static font-metric tables for the four Helvetica faces used on exam papers.
//!
//! Character widths are in em units (relative to font size), taken from the
//! standard Helvetica AFM widths. The oblique faces share the upright widths.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.
//!
//! Every measurement the layout engine relies on (line breaks, pairing, block
//! heights) goes through `FontBook`, so two papers measured with the same book
//! always break lines identically.

use serde::{Deserialize, Serialize};

/// Millimetres per PostScript point.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontFace {
    pub const ALL: [FontFace; 4] = [
        FontFace::Regular,
        FontFace::Bold,
        FontFace::Italic,
        FontFace::BoldItalic,
    ];

    /// PostScript name of the standard 14 font backing this face.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Italic => "Helvetica-Oblique",
            FontFace::BoldItalic => "Helvetica-BoldOblique",
        }
    }

    /// Resource name used inside PDF content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Italic => "F3",
            FontFace::BoldItalic => "F4",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetricTable {
    pub face: FontFace,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    pub fn new(face: FontFace, widths: [f32; 95], average_char_width: f32) -> Self {
        Self {
            face,
            space_width: widths[0],
            widths,
            average_char_width,
        }
    }

    /// Same widths, relabelled for another face (used for the oblique faces).
    pub fn for_face(&self, face: FontFace) -> Self {
        Self {
            face,
            ..self.clone()
        }
    }

    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Greedy word-wrap at `max_width_em`. Returns the printed lines.
    ///
    /// Explicit newlines start a new line. A word wider than the whole line is
    /// broken between characters. Empty or whitespace-only text yields no lines.
    pub fn wrap(&self, text: &str, max_width_em: f32) -> Vec<String> {
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0_f32;

            for word in paragraph.split_whitespace() {
                let word_w = self.measure_str(word);

                if word_w > max_width_em {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    let mut pieces = self.break_word(word, max_width_em);
                    let last = pieces.pop().unwrap_or_default();
                    lines.extend(pieces);
                    current_width = self.measure_str(&last);
                    current = last;
                    continue;
                }

                if current.is_empty() {
                    current.push_str(word);
                    current_width = word_w;
                } else if current_width + self.space_width + word_w > max_width_em {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(word);
                    current_width = word_w;
                } else {
                    current.push(' ');
                    current.push_str(word);
                    current_width += self.space_width + word_w;
                }
            }

            if !current.is_empty() {
                lines.push(current);
            }
        }

        lines
    }

    /// Splits an over-long word into pieces no wider than `max_width_em`.
    /// Each piece carries at least one character.
    fn break_word(&self, word: &str, max_width_em: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0_f32;

        for c in word.chars() {
            let w = self.char_width(c);
            if !piece.is_empty() && width + w > max_width_em {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(c);
            width += w;
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font book
// ────────────────────────────────────────────────────────────────────────────

/// Where the tables in a `FontBook` came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum MetricsOrigin {
    BuiltIn,
    File(String),
}

/// The complete set of face metrics shared read-only by every layout pass.
#[derive(Debug, Clone)]
pub struct FontBook {
    regular: FontMetricTable,
    bold: FontMetricTable,
    italic: FontMetricTable,
    bold_italic: FontMetricTable,
    pub origin: MetricsOrigin,
}

impl FontBook {
    /// Built-in Helvetica tables. This is also the fallback when an override
    /// file cannot be loaded.
    pub fn builtin() -> Self {
        Self {
            regular: HELVETICA_TABLE.clone(),
            bold: HELVETICA_BOLD_TABLE.clone(),
            italic: HELVETICA_TABLE.for_face(FontFace::Italic),
            bold_italic: HELVETICA_BOLD_TABLE.for_face(FontFace::BoldItalic),
            origin: MetricsOrigin::BuiltIn,
        }
    }

    pub fn table(&self, face: FontFace) -> &FontMetricTable {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
            FontFace::BoldItalic => &self.bold_italic,
        }
    }

    /// Replaces the table for `table.face`.
    pub fn with_table(mut self, table: FontMetricTable) -> Self {
        match table.face {
            FontFace::Regular => self.regular = table,
            FontFace::Bold => self.bold = table,
            FontFace::Italic => self.italic = table,
            FontFace::BoldItalic => self.bold_italic = table,
        }
        self
    }

    /// Width of `text` in millimetres at `size_pt`.
    pub fn text_width_mm(&self, text: &str, face: FontFace, size_pt: f32) -> f32 {
        self.table(face).measure_str(text) * em_to_mm(size_pt)
    }

    /// Wraps `text` to lines no wider than `max_width_mm` at `size_pt`.
    pub fn wrap_mm(&self, text: &str, max_width_mm: f32, face: FontFace, size_pt: f32) -> Vec<String> {
        let em = em_to_mm(size_pt);
        let max_width_em = if em > 0.0 { max_width_mm / em } else { 0.0 };
        self.table(face).wrap(text, max_width_em)
    }
}

/// Size of one em in millimetres at `size_pt`.
pub fn em_to_mm(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica (regular and oblique).
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::Regular,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.52,
    space_width: 0.278,
};

/// Helvetica Bold (bold and bold oblique).
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::Bold,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.56,
    space_width: 0.278,
};

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn regular() -> FontMetricTable {
        FontBook::builtin().table(FontFace::Regular).clone()
    }

    #[test]
    fn test_measure_known_glyphs() {
        let t = regular();
        assert!((t.measure_str("A") - 0.667).abs() < 1e-6);
        assert!((t.measure_str("ii") - 0.444).abs() < 1e-6);
        assert!((t.measure_str(" ") - t.space_width).abs() < 1e-6);
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let t = regular();
        assert!((t.measure_str("é") - t.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let book = FontBook::builtin();
        let text = "Photosynthesis happens in chloroplasts";
        assert!(
            book.text_width_mm(text, FontFace::Bold, 12.0)
                > book.text_width_mm(text, FontFace::Regular, 12.0)
        );
    }

    #[test]
    fn test_oblique_shares_upright_widths() {
        let book = FontBook::builtin();
        let text = "Which gas do plants absorb?";
        assert_eq!(
            book.text_width_mm(text, FontFace::Italic, 12.0),
            book.text_width_mm(text, FontFace::Regular, 12.0)
        );
    }

    #[test]
    fn test_wrap_empty_text_has_no_lines() {
        assert!(regular().wrap("", 10.0).is_empty());
        assert!(regular().wrap("   ", 10.0).is_empty());
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = regular().wrap("Short answer", 40.0);
        assert_eq!(lines, vec!["Short answer".to_string()]);
    }

    #[test]
    fn test_wrap_greedy_breaks_between_words() {
        let t = regular();
        let text = "word ".repeat(30);
        let max = 10.0;
        let lines = t.wrap(&text, max);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(t.measure_str(line) <= max + 1e-4, "line too wide: {line}");
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined.split_whitespace().count(), 30);
    }

    #[test]
    fn test_wrap_normalizes_whitespace() {
        let lines = regular().wrap("A.   B.\tC.", 40.0);
        assert_eq!(lines, vec!["A. B. C.".to_string()]);
    }

    #[test]
    fn test_wrap_honours_explicit_newlines() {
        let lines = regular().wrap("first\nsecond", 40.0);
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let t = regular();
        let word = "m".repeat(40);
        let lines = t.wrap(&word, 5.0);
        assert!(lines.len() >= 4);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(t.measure_str(line) <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_wrap_mm_scales_with_font_size() {
        let book = FontBook::builtin();
        let text = "The mitochondria is the powerhouse of the cell";
        let small = book.wrap_mm(text, 40.0, FontFace::Regular, 8.0);
        let large = book.wrap_mm(text, 40.0, FontFace::Regular, 16.0);
        assert!(large.len() > small.len());
    }

    #[test]
    fn test_with_table_replaces_face() {
        let narrow = FontMetricTable::new(FontFace::Bold, [0.1; 95], 0.1);
        let book = FontBook::builtin().with_table(narrow);
        assert!((book.table(FontFace::Bold).measure_str("W") - 0.1).abs() < 1e-6);
        assert!((book.table(FontFace::Regular).measure_str("W") - 0.944).abs() < 1e-6);
    }
}
