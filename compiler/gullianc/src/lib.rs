//! The compiler pipeline behind the `gullian` binary: source text to C
//! text, in one call.

use std::path::{Path, PathBuf};

use gullian_diagnostic::{Diagnostic, Result};
use gullian_types::Context;

/// Compile one source string as the root module.
///
/// `home` overrides the `GULLIAN_HOME` fallback import root; pass `None`
/// to take it from the environment.
pub fn compile_source(source: &str, home: Option<PathBuf>) -> Result<String> {
    let mut ctx = Context::new();
    ctx.home = home.or_else(|| std::env::var_os("GULLIAN_HOME").map(PathBuf::from));

    let root = ctx.add_module("main");
    let tokens = gullian_lexer::lex(source, "main")?;
    let items = gullian_parse::parse(tokens, "main")?;
    gullian_typeck::check_module(&mut ctx, root, items)?;

    Ok(gullian_codegen::emit(&ctx, root))
}

/// Compile `infile` and write the C output to `outfile`.
pub fn compile_file(infile: &Path, outfile: &Path) -> Result<()> {
    let source = std::fs::read_to_string(infile).map_err(|io| {
        Diagnostic::import(format!("can't read {}: {io}", infile.display()), 0, "main")
    })?;

    let code = compile_source(&source, None)?;

    std::fs::write(outfile, code).map_err(|io| {
        Diagnostic::import(format!("can't write {}: {io}", outfile.display()), 0, "main")
    })?;
    Ok(())
}
