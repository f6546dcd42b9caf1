//! Rendering of ROOT TLatex-style markup into plain Unicode text.
//!
//! The annotation and axis strings are written in the markup the rest of the
//! analysis chain uses (`#it{p}_{T}`, `D^{0} #rightarrow K^{-}#pi^{+}`, ...).
//! The image backends only draw plain text, so the subset of commands that
//! appears in the plots is translated here:
//!
//! | markup                 | rendered          |
//! |------------------------|-------------------|
//! | `#it{x}`, `#bf{x}`     | `x`               |
//! | `#font[122]{-}`        | `−` (symbol font) |
//! | `#pi`, `#Lambda`, ...  | Greek letters     |
//! | `#rightarrow`, `#pm`   | `→`, `±`          |
//! | `#sqrt{s}`             | `√s`              |
//! | `^{0}`, `_{n}`         | `⁰`, `ₙ` where Unicode has the glyph, plain text otherwise |
//! | `#splitline{a}{b}`     | `a` newline `b`   |
//!
//! Unknown commands are kept by name without the leading `#`.

/// Render `markup` to Unicode. `#splitline` produces embedded newlines.
pub fn to_unicode(markup: &str) -> String {
    let mut parser = Parser {
        chars: markup.chars().collect(),
        pos: 0,
    };
    parser.sequence(None)
}

/// Render `markup` and split it into display lines.
pub fn to_lines(markup: &str) -> Vec<String> {
    to_unicode(markup).split('\n').map(str::to_string).collect()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Parse until `close` (consumed) or end of input.
    fn sequence(&mut self, close: Option<char>) -> String {
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if Some(c) == close {
                break;
            }
            match c {
                '#' => out.push_str(&self.command()),
                '^' => {
                    let arg = self.argument();
                    out.push_str(&script(&arg, superscript));
                }
                '_' => {
                    let arg = self.argument();
                    out.push_str(&script(&arg, subscript));
                }
                '{' => out.push_str(&self.sequence(Some('}'))),
                other => out.push(other),
            }
        }
        out
    }

    /// A `{...}` group, or a single character when no brace follows.
    fn argument(&mut self) -> String {
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                self.sequence(Some('}'))
            }
            Some('#') => {
                self.pos += 1;
                self.command()
            }
            Some(c) => {
                self.pos += 1;
                c.to_string()
            }
            None => String::new(),
        }
    }

    /// Optional `[...]` option after a command name.
    fn option(&mut self) -> Option<String> {
        if self.peek() != Some('[') {
            return None;
        }
        self.pos += 1;
        let mut opt = String::new();
        while let Some(c) = self.bump() {
            if c == ']' {
                break;
            }
            opt.push(c);
        }
        Some(opt)
    }

    fn command(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        if name.is_empty() {
            // `##` and `#{` escape the following character.
            return self.bump().map(String::from).unwrap_or_default();
        }

        match name.as_str() {
            "it" | "bf" | "mathrm" | "color" | "scale" => {
                self.option();
                self.argument()
            }
            "font" => {
                let font = self.option();
                let inner = self.argument();
                if font.as_deref() == Some("122") {
                    inner.replace('-', "\u{2212}")
                } else {
                    inner
                }
            }
            "splitline" => {
                let top = self.argument();
                let bottom = self.argument();
                format!("{top}\n{bottom}")
            }
            "sqrt" => format!("\u{221a}{}", self.argument()),
            other => match symbol(other) {
                Some(sym) => sym.to_string(),
                None => other.to_string(),
            },
        }
    }
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "eta" => "η",
        "theta" => "θ",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "rightarrow" => "→",
        "leftarrow" => "←",
        "pm" => "±",
        "mp" => "∓",
        "minus" => "\u{2212}",
        "times" => "×",
        "cdot" => "·",
        "approx" => "≈",
        "leq" => "≤",
        "geq" => "≥",
        "infty" => "∞",
        _ => return None,
    })
}

/// Map every char through `table`; fall back to the plain text if any char
/// has no script form, so mixed glyph heights never appear.
fn script(text: &str, table: fn(char) -> Option<char>) -> String {
    text.chars()
        .map(table)
        .collect::<Option<String>>()
        .unwrap_or_else(|| text.to_string())
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '\u{2212}' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'a' => 'ᵃ',
        'b' => 'ᵇ',
        'c' => 'ᶜ',
        'd' => 'ᵈ',
        'e' => 'ᵉ',
        'i' => 'ⁱ',
        'k' => 'ᵏ',
        'm' => 'ᵐ',
        'n' => 'ⁿ',
        'o' => 'ᵒ',
        'p' => 'ᵖ',
        'r' => 'ʳ',
        's' => 'ˢ',
        't' => 'ᵗ',
        'w' => 'ʷ',
        ' ' => ' ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '\u{2212}' => '₋',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'x' => 'ₓ',
        ' ' => ' ',
        _ => return None,
    })
}
