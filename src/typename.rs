//! Assembly-qualified type names.
//!
//! Manifest entries name their readers the way the .NET runtime prints a
//! type: namespace-qualified, with `+` between nested classes, generic
//! arguments in brackets, array/pointer/byref suffixes and an optional
//! trailing assembly clause:
//!
//! ```text
//! Microsoft.Xna.Framework.Content.DictionaryReader`2[[System.String, mscorlib],[System.Int32]]
//! Outer+Inner[][,]*&, SomeAssembly, Version=1.0.0.0
//! ```
//!
//! Any of `+ , [ ] & * \` can appear in an identifier when escaped with a
//! backslash.
//!
//! [`TypeSpec::parse`] turns such a string into a [`TypeSpec`];
//! [`fmt::Display`] renders it back in canonical form (nested segments,
//! generic arguments each in their own brackets, array specifiers, pointer
//! stars, byref, assembly), so `parse(render(parse(s))) == parse(s)`.

use std::fmt;

use crate::{Error, Result};

/// Characters that must be escaped inside an identifier.
const SPECIAL: &[char] = &['+', ',', '[', ']', '&', '*', '\\'];

/// Deepest generic argument nesting accepted by [`TypeSpec::parse`].
pub const MAX_GENERIC_DEPTH: usize = 64;

/// One array suffix: `[]`, `[,]`, `[*]` ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArraySpec {
    /// Rank of the array; one more than the number of commas.
    pub dimensions: u32,
    /// `[*]`: a single-dimension array with explicit bounds, which is a
    /// different array kind from `[]`.
    pub bound: bool,
}

/// A parsed type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeSpec {
    /// Outermost (namespace-qualified) name, unescaped.
    pub name: String,
    /// Nested class names following `+`, outermost first.
    pub nested: Vec<String>,
    /// Generic arguments; empty for non-generic types.
    pub generic_params: Vec<TypeSpec>,
    /// Array suffixes in source order. More than one means a jagged array.
    pub array_spec: Vec<ArraySpec>,
    /// Number of trailing `*`.
    pub pointer_level: u32,
    /// Trailing `&`.
    pub is_byref: bool,
    /// The `, Assembly, Version=...` clause, trimmed.
    pub assembly_name: Option<String>,
}

impl TypeSpec {
    /// Parse a complete type name. The whole string must be consumed.
    pub fn parse(s: &str) -> Result<Self> {
        let mut p = Parser {
            src: s,
            pos: 0,
            depth: 0,
        };
        let spec = p.type_spec(Ctx::Top)?;
        p.skip_ws();
        if p.pos != s.len() {
            return Err(p.err("did not consume whole string"));
        }
        Ok(spec)
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    /// True when the name has no generic, array, pointer or byref parts.
    pub fn is_plain(&self) -> bool {
        self.generic_params.is_empty()
            && self.array_spec.is_empty()
            && self.pointer_level == 0
            && !self.is_byref
    }

    /// Name plus nested segments, without any brackets or suffixes.
    ///
    /// For a generic type this is the open generic name, e.g.
    /// ``System.Collections.Generic.List`1``.
    pub fn base_name(&self) -> String {
        let mut out = String::new();
        self.render_base(&mut out);
        out
    }

    /// Canonical rendering with every assembly clause stripped, including
    /// those of generic arguments. Registry lookups key on this.
    pub fn full_name(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, false);
        out
    }

    /// The element type of an array type: the same spec with its last
    /// array suffix removed. `None` unless the outermost modifier is an
    /// array.
    pub fn element_type(&self) -> Option<TypeSpec> {
        if self.array_spec.is_empty() || self.pointer_level > 0 || self.is_byref {
            return None;
        }
        let mut elem = self.clone();
        elem.array_spec.pop();
        elem.assembly_name = None;
        Some(elem)
    }

    fn render_base(&self, out: &mut String) {
        escape_into(out, &self.name);
        for n in &self.nested {
            out.push('+');
            escape_into(out, n);
        }
    }

    fn render(&self, out: &mut String, qualified: bool) {
        self.render_base(out);
        if !self.generic_params.is_empty() {
            out.push('[');
            for (i, p) in self.generic_params.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('[');
                p.render(out, qualified);
                out.push(']');
            }
            out.push(']');
        }
        for a in &self.array_spec {
            out.push('[');
            if a.bound {
                out.push('*');
            } else {
                for _ in 1..a.dimensions {
                    out.push(',');
                }
            }
            out.push(']');
        }
        for _ in 0..self.pointer_level {
            out.push('*');
        }
        if self.is_byref {
            out.push('&');
        }
        if qualified {
            if let Some(asm) = &self.assembly_name {
                out.push_str(", ");
                out.push_str(asm);
            }
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, true);
        f.write_str(&out)
    }
}

fn escape_into(out: &mut String, ident: &str) {
    for c in ident.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Where a type name is being parsed; decides what `,` and `]` mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    /// The whole input. `,` starts the assembly clause, `]` is an error.
    Top,
    /// A bare generic argument. `,` and `]` end it.
    Arg,
    /// A generic argument wrapped in its own brackets. `,` starts the
    /// assembly clause, `]` ends it.
    QualifiedArg,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn err(&self, reason: &'static str) -> Error {
        Error::TypeName {
            name: self.src.to_owned(),
            pos: self.pos,
            reason,
        }
    }

    fn identifier(&mut self) -> Result<String> {
        self.skip_ws();
        let mut out = String::new();
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some(e) if SPECIAL.contains(&e) => out.push(e),
                        _ => return Err(self.err("invalid escape sequence")),
                    }
                }
                '+' | ',' | '[' | ']' | '&' | '*' => break,
                _ => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        // Escaped characters are never whitespace, so trimming is safe.
        let trimmed = out.trim_end();
        if trimmed.is_empty() {
            return Err(self.err("expected type name"));
        }
        Ok(trimmed.to_owned())
    }

    fn type_spec(&mut self, ctx: Ctx) -> Result<TypeSpec> {
        let mut spec = TypeSpec {
            name: self.identifier()?,
            ..TypeSpec::default()
        };
        while self.peek() == Some('+') {
            self.bump();
            spec.nested.push(self.identifier()?);
        }

        loop {
            self.skip_ws();
            match self.peek() {
                None => break,
                Some('[') => self.bracket(&mut spec)?,
                Some('*') => {
                    if spec.is_byref {
                        return Err(self.err("pointer after byref"));
                    }
                    self.bump();
                    spec.pointer_level += 1;
                }
                Some('&') => {
                    if spec.is_byref {
                        return Err(self.err("duplicate byref"));
                    }
                    self.bump();
                    spec.is_byref = true;
                }
                Some(',') => match ctx {
                    Ctx::Arg => break,
                    Ctx::Top | Ctx::QualifiedArg => {
                        self.bump();
                        spec.assembly_name = Some(self.assembly(ctx)?);
                        break;
                    }
                },
                Some(']') => match ctx {
                    Ctx::Top => return Err(self.err("unmatched ']'")),
                    Ctx::Arg | Ctx::QualifiedArg => break,
                },
                Some(_) => return Err(self.err("unexpected character after type name")),
            }
        }
        Ok(spec)
    }

    /// Parse one bracket group: an array specifier or a generic argument
    /// list, told apart by the first character inside the bracket.
    fn bracket(&mut self, spec: &mut TypeSpec) -> Result<()> {
        if spec.is_byref {
            return Err(self.err("array or generic arguments after byref"));
        }
        let open = self.pos;
        self.bump();
        self.skip_ws();
        if matches!(self.peek(), Some(',' | '*' | ']')) {
            if spec.pointer_level > 0 {
                return Err(self.err("array specifier after pointer"));
            }
            let mut dimensions = 1;
            let mut bound = false;
            loop {
                self.skip_ws();
                match self.bump() {
                    Some(',') => dimensions += 1,
                    Some('*') if !bound => bound = true,
                    Some('*') => return Err(self.err("duplicate '*' in array specifier")),
                    Some(']') => break,
                    _ => return Err(self.err("invalid array specifier")),
                }
            }
            // A multi-dimensional array is always bound; only rank 1 has
            // two kinds.
            spec.array_spec.push(ArraySpec {
                dimensions,
                bound: bound && dimensions == 1,
            });
            return Ok(());
        }

        if spec.is_generic() || !spec.array_spec.is_empty() || spec.pointer_level > 0 {
            self.pos = open;
            return Err(self.err("generic arguments after array or pointer specifier"));
        }
        if self.depth >= MAX_GENERIC_DEPTH {
            return Err(self.err("type name nested too deeply"));
        }
        self.depth += 1;
        let args = self.generic_args(spec);
        self.depth -= 1;
        args
    }

    fn generic_args(&mut self, spec: &mut TypeSpec) -> Result<()> {
        loop {
            self.skip_ws();
            let arg = if self.peek() == Some('[') {
                self.bump();
                let arg = self.type_spec(Ctx::QualifiedArg)?;
                self.skip_ws();
                if self.bump() != Some(']') {
                    return Err(self.err("unterminated generic argument"));
                }
                arg
            } else {
                self.type_spec(Ctx::Arg)?
            };
            spec.generic_params.push(arg);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => break,
                _ => return Err(self.err("unterminated generic argument list")),
            }
        }
        Ok(())
    }

    /// Capture an assembly clause verbatim. At top level it runs to the end
    /// of input; inside a bracketed argument it stops at the closing `]`.
    fn assembly(&mut self, ctx: Ctx) -> Result<String> {
        let start = self.pos;
        if ctx == Ctx::Top {
            self.pos = self.src.len();
        } else {
            while let Some(c) = self.peek() {
                match c {
                    '\\' => {
                        self.bump();
                        self.bump();
                    }
                    ']' => break,
                    _ => {
                        self.bump();
                    }
                }
            }
        }
        let asm = self.src[start..self.pos].trim();
        if asm.is_empty() {
            return Err(self.err("empty assembly name"));
        }
        Ok(asm.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeSpec {
        TypeSpec::parse(s).unwrap_or_else(|e| panic!("{s:?} should parse: {e}"))
    }

    fn assert_round_trip(s: &str) {
        let first = parse(s);
        let rendered = first.to_string();
        let second = parse(&rendered);
        assert_eq!(first, second, "round trip of {s:?} via {rendered:?}");
    }

    #[test]
    fn test_plain_name() {
        let t = parse("System.Int32");
        assert_eq!(t.name, "System.Int32");
        assert!(t.is_plain());
        assert_eq!(t.to_string(), "System.Int32");
    }

    #[test]
    fn test_nested_name() {
        let t = parse("Outer+Inner+Deepest");
        assert_eq!(t.name, "Outer");
        assert_eq!(t.nested, vec!["Inner", "Deepest"]);
        assert_eq!(t.to_string(), "Outer+Inner+Deepest");
    }

    #[test]
    fn test_array_kinds() {
        assert_eq!(parse("Foo[]").array_spec, vec![ArraySpec { dimensions: 1, bound: false }]);
        assert_eq!(parse("Foo[*]").array_spec, vec![ArraySpec { dimensions: 1, bound: true }]);
        assert_eq!(parse("Foo[,]").array_spec, vec![ArraySpec { dimensions: 2, bound: false }]);
        assert_eq!(parse("Foo[ , , ]").to_string(), "Foo[,,]");
        let jagged = parse("Foo[][,]");
        assert_eq!(jagged.array_spec.len(), 2);
        assert_eq!(jagged.to_string(), "Foo[][,]");
    }

    #[test]
    fn test_generic_two_args() {
        let t = parse("Dict`2[[System.String],[System.Int32]]");
        assert_eq!(t.name, "Dict`2");
        assert_eq!(t.generic_params.len(), 2);
        assert_eq!(t.generic_params[1].name, "System.Int32");
        assert_eq!(t.to_string(), "Dict`2[[System.String],[System.Int32]]");
    }

    #[test]
    fn test_generic_unbracketed_args() {
        let t = parse("Dict`2[System.String, System.Int32]");
        assert_eq!(t.to_string(), "Dict`2[[System.String],[System.Int32]]");
    }

    #[test]
    fn test_assembly_qualified_argument() {
        let t = parse("List`1[[System.String, mscorlib, Version=4.0.0.0, Culture=neutral]]");
        assert_eq!(
            t.generic_params[0].assembly_name.as_deref(),
            Some("mscorlib, Version=4.0.0.0, Culture=neutral")
        );
        assert_eq!(t.full_name(), "List`1[[System.String]]");
        assert_round_trip("List`1[[System.String, mscorlib]]");
    }

    #[test]
    fn test_top_level_assembly() {
        let t = parse(
            "Microsoft.Xna.Framework.Content.Texture2DReader, Microsoft.Xna.Framework.Graphics, Version=4.0.0.0",
        );
        assert_eq!(t.name, "Microsoft.Xna.Framework.Content.Texture2DReader");
        assert_eq!(
            t.assembly_name.as_deref(),
            Some("Microsoft.Xna.Framework.Graphics, Version=4.0.0.0")
        );
        assert_eq!(t.full_name(), "Microsoft.Xna.Framework.Content.Texture2DReader");
    }

    #[test]
    fn test_pointer_and_byref() {
        let t = parse("Foo[]**&");
        assert_eq!(t.pointer_level, 2);
        assert!(t.is_byref);
        assert_eq!(t.to_string(), "Foo[]**&");
    }

    #[test]
    fn test_escapes() {
        let t = parse(r"Weird\,Name\+X\[\]");
        assert_eq!(t.name, "Weird,Name+X[]");
        assert!(t.nested.is_empty());
        assert_eq!(t.to_string(), r"Weird\,Name\+X\[\]");
        assert_round_trip(r"A\&B+C\*D");
    }

    #[test]
    fn test_round_trips() {
        for s in [
            "System.Int32",
            "Outer+Inner",
            "Foo[]",
            "Foo[*]",
            "Foo[,]",
            "Dict`2[[System.String],[System.Int32]]",
            "List`1[[System.String, mscorlib]]",
            "A+B`1[[C[], asm, Version=1.0]][][,]**&, Main, Culture=neutral",
            "Outer`1[[Inner`2[[X],[Y[]]]]]",
            "  Spaced.Name  [ ]  ",
        ] {
            assert_round_trip(s);
        }
    }

    #[test]
    fn test_element_type() {
        let t = parse("Foo[][,]");
        assert_eq!(t.element_type().expect("array").to_string(), "Foo[]");
        assert!(parse("Foo").element_type().is_none());
        assert!(parse("Foo[]*").element_type().is_none());
    }

    fn nested_generic(levels: usize) -> String {
        let mut name = "Leaf".to_owned();
        for _ in 0..levels {
            name = format!("Box`1[[{name}]]");
        }
        name
    }

    #[test]
    fn test_generic_depth_limit() {
        let ok = parse(&nested_generic(MAX_GENERIC_DEPTH));
        assert_eq!(ok.to_string(), nested_generic(MAX_GENERIC_DEPTH));

        let err = TypeSpec::parse(&nested_generic(MAX_GENERIC_DEPTH + 1)).unwrap_err();
        assert!(
            matches!(err, Error::TypeName { reason: "type name nested too deeply", .. }),
            "{err}"
        );

        // Far past any stack limit; must fail, not overflow.
        let huge = "A`1[[".repeat(200_000) + "B" + &"]]".repeat(200_000);
        assert!(matches!(TypeSpec::parse(&huge), Err(Error::TypeName { .. })));
    }

    #[test]
    fn test_rejections() {
        for bad in [
            "",
            "   ",
            "Foo]",
            "Foo+",
            "Foo&&",
            "Foo&*",
            "Foo&[]",
            "Foo[]x",
            "Foo[][[Bar]]",
            "Foo*[]",
            "Foo[[Bar]",
            "Foo[*,*]",
            "Foo[[Bar, ]]",
            "Foo, ",
            r"Foo\q",
            "Foo[[A]][[B]]",
        ] {
            assert!(
                matches!(TypeSpec::parse(bad), Err(Error::TypeName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
