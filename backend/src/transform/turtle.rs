//! Turtle serialization.
//!
//! Output is, in order: one `@prefix` line per namespace (table order), the
//! `@base` line, a blank line, then every statement in emission order. No
//! sorting or merging happens here, so the text is a direct function of the
//! input rows and the configuration order.
//!
//! ```text
//! @prefix ex: <http://example.org/ontology/> .
//! @base <http://example.org/resource/> .
//!
//! <pub/42> a ex:Publication ;
//!     dc:title "O'Brien's Tale" .
//! ```

use std::fmt;

use crate::models::Namespaces;

use super::literal::Literal;

/// Render a predicate, class or datatype reference.
///
/// Prefixed names and `<...>` references pass through verbatim; bare
/// absolute IRIs are wrapped in angle brackets.
pub fn format_iri_ref(term: &str) -> String {
    let term = term.trim();
    if !term.starts_with('<') && term.contains("://") {
        format!("<{}>", term)
    } else {
        term.to_string()
    }
}

/// Object of a generated triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Literal(Literal),
    /// Resource path relative to `@base`, e.g. `author/ann-lee`.
    Resource(String),
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Literal(literal) => fmt::Display::fmt(literal, f),
            Object::Resource(path) => write!(f, "<{}>", path),
        }
    }
}

/// Predicate and object of a triple whose subject is implicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub predicate: String,
    pub object: Object,
}

impl Fragment {
    pub fn new(predicate: &str, object: Object) -> Self {
        Self {
            predicate: predicate.to_string(),
            object,
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_iri_ref(&self.predicate), self.object)
    }
}

/// Type declaration of one resource followed by its property fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Path relative to `@base`, e.g. `pub/42`.
    pub subject: String,
    pub class: String,
    pub fragments: Vec<Fragment>,
}

impl Statement {
    /// Number of triples, the type declaration included.
    pub fn triple_count(&self) -> usize {
        1 + self.fragments.len()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> a {}", self.subject, format_iri_ref(&self.class))?;
        for fragment in &self.fragments {
            write!(f, " ;\n    {}", fragment)?;
        }
        f.write_str(" .")
    }
}

/// A complete Turtle document.
pub struct TurtleDocument<'a> {
    pub namespaces: &'a Namespaces,
    pub base_uri: &'a str,
    pub statements: &'a [Statement],
}

impl fmt::Display for TurtleDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (prefix, iri) in self.namespaces.iter() {
            writeln!(f, "@prefix {}: <{}> .", prefix, iri)?;
        }
        writeln!(f, "@base <{}> .", self.base_uri)?;
        writeln!(f)?;

        for statement in self.statements {
            write!(f, "{}\n\n", statement)?;
        }
        Ok(())
    }
}

/// Serialize prefixes, base and statements into Turtle text.
pub fn serialize_turtle(namespaces: &Namespaces, base_uri: &str, statements: &[Statement]) -> String {
    TurtleDocument {
        namespaces,
        base_uri,
        statements,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(subject: &str, fragments: Vec<Fragment>) -> Statement {
        Statement {
            subject: subject.to_string(),
            class: "ex:Publication".to_string(),
            fragments,
        }
    }

    #[test]
    fn test_bare_type_declaration() {
        assert_eq!(statement("pub/1", vec![]).to_string(), "<pub/1> a ex:Publication .");
    }

    #[test]
    fn test_statement_with_fragments() {
        let s = statement(
            "pub/42",
            vec![
                Fragment::new("dc:title", Object::Literal(Literal::new("O'Brien's Tale", "xsd:string"))),
                Fragment::new("dc:creator", Object::Resource("author/ann".into())),
            ],
        );
        assert_eq!(
            s.to_string(),
            "<pub/42> a ex:Publication ;\n    dc:title \"O'Brien's Tale\" ;\n    dc:creator <author/ann> ."
        );
        assert_eq!(s.triple_count(), 3);
    }

    #[test]
    fn test_document_layout() {
        let mut namespaces = Namespaces::reserved();
        namespaces.insert("ex", "http://example.org/ontology/");
        let statements = vec![statement("pub/1", vec![]), statement("pub/2", vec![])];

        let ttl = serialize_turtle(&namespaces, "http://example.org/r/", &statements);
        assert_eq!(
            ttl,
            "@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n\
             @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
             @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n\
             @prefix ex: <http://example.org/ontology/> .\n\
             @base <http://example.org/r/> .\n\
             \n\
             <pub/1> a ex:Publication .\n\
             \n\
             <pub/2> a ex:Publication .\n\
             \n"
        );
    }

    #[test]
    fn test_format_iri_ref() {
        assert_eq!(format_iri_ref("dc:title"), "dc:title");
        assert_eq!(format_iri_ref(" <http://x.org/p> "), "<http://x.org/p>");
        assert_eq!(format_iri_ref("http://x.org/p"), "<http://x.org/p>");
    }
}
