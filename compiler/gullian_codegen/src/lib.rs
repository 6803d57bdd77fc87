//! C code generation: fold a checked module tree into one translation
//! unit.
//!
//! Emission order matters for C:
//! 1. `#include` lines harvested from source comments, per module.
//! 2. The fixed preamble (standard includes and primitive `#define`s),
//!    once for the whole unit.
//! 3. Type definitions and function prototypes, imports before their
//!    importers, each module emitted at most once (deduplicated by name).
//! 4. Globals, then all function bodies, in the same module order.
//!
//! Generic definitions are skipped; only their monomorphized instances
//! appear in the output.

mod context;
mod expr;
mod stmt;
mod types;

use rustc_hash::FxHashSet;

use context::CWriter;
use gullian_types::{Context, FunctionKind, ModuleId};

/// Fixed preamble includes for the root translation unit.
const PREAMBLE_INCLUDES: &[&str] = &[
    "<stddef.h>",
    "<stdint.h>",
    "<stdbool.h>",
    "<malloc.h>",
    "<string.h>",
    "<stdlib.h>",
    "<stdio.h>",
];

/// Primitive name to C type `#define`s.
const PREAMBLE_DEFINES: &[(&str, &str)] = &[
    ("u8", "uint8_t"),
    ("u16", "uint16_t"),
    ("u32", "uint32_t"),
    ("byte", "uint8_t"),
    ("str", "char*"),
    ("ptr", "char*"),
    ("any", "char*"),
    ("type", "size_t"),
];

/// Emit a checked root module and its transitive imports as C source.
pub fn emit(ctx: &Context, root: ModuleId) -> String {
    let modules = ordered_modules(ctx, root);
    let mut gen = CGen {
        ctx,
        out: CWriter::new(),
        switch_tmp: 0,
    };

    // 1. Harvested user includes.
    for &module in &modules {
        for include in &ctx.module(module).includes {
            gen.out.line(include);
        }
    }

    // 2. Preamble.
    for include in PREAMBLE_INCLUDES {
        gen.out.line(&format!("#include {include}"));
    }
    for (name, c_name) in PREAMBLE_DEFINES {
        gen.out.line(&format!("#define {name} {c_name}"));
    }
    gen.out.blank();

    // 3. Type definitions and prototypes, imports first.
    for &module in &modules {
        for &ty in &ctx.module(module).decl_order {
            if !gen.is_generic_type(ty) {
                gen.emit_type_definition(ty);
            }
        }
    }
    gen.out.blank();
    for &module in &modules {
        for &func in &ctx.module(module).fn_order {
            if !ctx.function(func).head.is_generic() {
                gen.emit_prototype(func);
            }
        }
    }
    gen.out.blank();

    // 4. Globals, then bodies.
    for &module in &modules {
        for (name, ty, value) in &ctx.module(module).globals {
            let value_text = gen.emit_expr(value);
            let c_ty = gen.c_type(*ty);
            gen.out.line(&format!("{c_ty} {name} = {value_text};"));
        }
    }
    gen.out.blank();

    for &module in &modules {
        for &func in &ctx.module(module).fn_order {
            let function = ctx.function(func);
            if function.head.is_generic() || function.is_extern() {
                continue;
            }
            let FunctionKind::User {
                typed: Some(body), ..
            } = &function.kind
            else {
                continue;
            };
            let signature = gen.function_signature(func);
            gen.out.line(&format!("{signature} {{"));
            gen.out.indent();
            gen.emit_body(body);
            gen.out.dedent();
            gen.out.line("}");
            gen.out.blank();
        }
    }

    gen.out.finish()
}

/// Modules in emission order: imports before importers, each exactly
/// once, deduplicated by module name.
fn ordered_modules(ctx: &Context, root: ModuleId) -> Vec<ModuleId> {
    let mut seen = FxHashSet::default();
    let mut order = Vec::new();
    visit(ctx, root, &mut seen, &mut order);
    order
}

fn visit(ctx: &Context, module: ModuleId, seen: &mut FxHashSet<String>, order: &mut Vec<ModuleId>) {
    if !seen.insert(ctx.module(module).name.clone()) {
        return;
    }
    for &imported in ctx.module(module).imports.values() {
        visit(ctx, imported, seen, order);
    }
    order.push(module);
}

pub(crate) struct CGen<'ctx> {
    ctx: &'ctx Context,
    out: CWriter,
    switch_tmp: u32,
}

impl<'ctx> CGen<'ctx> {
    fn is_generic_type(&self, ty: gullian_types::TypeId) -> bool {
        self.ctx
            .pool
            .get(ty)
            .decl
            .as_ref()
            .is_some_and(gullian_types::TypeDecl::is_generic)
    }
}

#[cfg(test)]
mod tests;
