//! Lexer and recursive-descent parser for the AIR language.
//!
//! `parse` is the only public entry point most callers need: it turns
//! source text into an [`air_ast::AirAST`] or a single [`ParseError`].
//! The lexer and parser never partially succeed — on error, nothing
//! downstream sees an incomplete tree.

mod error;
mod lexer;
mod parser;

pub use error::{wrap_parse_error, ParseError, ParseErrorKind};
pub use lexer::{LexError, Lexer, Token, TokenKind};
pub use parser::parse;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn parses_fullstack_example() {
        let source = indoc! {r#"
            @app:tasks
            @db{
                Task{id:int:primary:auto,title:str:required,done:bool:default(false)}
            }
            @api(CRUD:/tasks>~db.Task)
            @ui(div>(h1>"Tasks"+list>~db.Task.findMany))
        "#};
        let ast = parse(source).unwrap();
        assert_eq!(ast.app.name, "tasks");
        assert!(ast.app.has_backend());
        assert_eq!(ast.app.db_block().unwrap().models[0].name, "Task");
        assert_eq!(ast.app.api_block().unwrap().routes[0].handler, "~db.Task");
    }

    #[test]
    fn reports_single_diagnostic_on_missing_app() {
        let err = parse("@state{x:int}").unwrap_err();
        let diag = wrap_parse_error(&err);
        assert_eq!(diag.code, "AIR-P001");
    }
}
