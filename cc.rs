//! Conditional compilation: drops items and statements whose `#[cc="x"]`
//! attribute names a feature that isn't enabled, mirroring
//! `oo_filter_cc` (`cc.c`) in the original. Filtering runs after parsing
//! and before binding, so name resolution never sees a binding that was
//! conditionally compiled out.

use std::collections::HashSet;

use crate::ast::{Block, ExprKind, File, Item, ItemKind, LiteralKind, Meta, MetaKind};
use crate::span::SourceMap;

/// An item or statement is kept unless one of its `cc` attributes names
/// a feature absent from `features`. Attributes that aren't `cc`, or
/// whose value isn't a string literal, are ignored here (they are
/// meaningful to other phases, not this one).
fn should_stay(attrs: &[Meta], features: &HashSet<String>, map: &SourceMap) -> bool {
  for attr in attrs {
    if map.text(attr.name) != "cc" {
      continue;
    }
    if let MetaKind::Unary(lit) = &attr.kind {
      if lit.kind == LiteralKind::String {
        let quoted = map.text(lit.span);
        let feature = &quoted[1..quoted.len() - 1];
        if !features.contains(feature) {
          return false;
        }
      }
    }
  }
  true
}

/// Filters an entire file in place: top-level items first, then the
/// bodies of whichever `fn` items survived.
pub fn filter_cc(file: &mut File, features: &HashSet<String>, map: &SourceMap) {
  let mut items: Vec<Item> = std::mem::take(&mut file.items);
  items.retain(|item| should_stay(&item.attrs, features, map));
  file.items = items;

  for i in 0..file.items.len() {
    let mut body = match &mut file.items[i].kind {
      ItemKind::Fun { body, .. } => std::mem::take(body),
      _ => continue,
    };
    filter_block(file, &mut body, features, map);
    if let ItemKind::Fun { body: slot, .. } = &mut file.items[i].kind {
      *slot = body;
    }
  }
}

fn filter_block(file: &mut File, block: &mut Block, features: &HashSet<String>, map: &SourceMap) {
  block.stmts.retain(|stmt| should_stay(&stmt.attrs, features, map));
  for stmt in &block.stmts {
    filter_expr(file, stmt.expr, features, map);
  }
}

/// Recurses into every expression kind that can syntactically contain a
/// nested block, matching `filter_exp`'s case list in `cc.c` one for one.
/// The expr's kind is cloned out, recursed into, then written back - the
/// alternative (holding a `&mut` into the arena across a call that also
/// needs `&mut File` for sibling lookups) doesn't typecheck.
fn filter_expr(file: &mut File, id: crate::ast::ExprId, features: &HashSet<String>, map: &SourceMap) {
  use ExprKind::*;
  let kind = file.expr(id).kind.clone();

  match kind {
    Ref(inner) | RefMut(inner) | Deref(inner) | DerefMut(inner) | Array(inner)
    | ProductAccessAnon(inner, _) | ProductAccessNamed(inner, _) | Not(inner) | Negate(inner)
    | Cast(inner, _) | ProductRepeated(inner, _) | Return(inner) | Break(inner) => {
      filter_expr(file, inner, features, map);
    }
    ArrayIndex(a, b) | BinOp(_, a, b) | Assign(_, a, b) => {
      filter_expr(file, a, features, map);
      filter_expr(file, b, features, map);
    }
    ValAssign(_, rhs) => filter_expr(file, rhs, features, map),
    ProductAnon(items) => {
      for item in items {
        filter_expr(file, item, features, map);
      }
    }
    ProductNamed(items) => {
      for (_, item) in items {
        filter_expr(file, item, features, map);
      }
    }
    FunAppAnon(fun, args) => {
      filter_expr(file, fun, features, map);
      for arg in args {
        filter_expr(file, arg, features, map);
      }
    }
    FunAppNamed(fun, args) => {
      filter_expr(file, fun, features, map);
      for (_, arg) in args {
        filter_expr(file, arg, features, map);
      }
    }
    Block(mut block) => {
      filter_block(file, &mut block, features, map);
      write_back(file, id, ExprKind::Block(block));
    }
    If { cond, mut if_block, mut else_block } => {
      filter_expr(file, cond, features, map);
      filter_block(file, &mut if_block, features, map);
      filter_block(file, &mut else_block, features, map);
      write_back(file, id, ExprKind::If { cond, if_block, else_block });
    }
    While { cond, mut block } => {
      filter_expr(file, cond, features, map);
      filter_block(file, &mut block, features, map);
      write_back(file, id, ExprKind::While { cond, block });
    }
    Case { matcher, mut arms } => {
      filter_expr(file, matcher, features, map);
      for (_, block) in arms.iter_mut() {
        filter_block(file, block, features, map);
      }
      write_back(file, id, ExprKind::Case { matcher, arms });
    }
    Loop { matcher, mut arms } => {
      filter_expr(file, matcher, features, map);
      for (_, block) in arms.iter_mut() {
        filter_block(file, block, features, map);
      }
      write_back(file, id, ExprKind::Loop { matcher, arms });
    }
    Id(_) | Macro(_) | Literal(_) | SizeOf(_) | AlignOf(_) | Val(_) | Goto(_) | Label(_) => {}
  }
}

fn write_back(file: &mut File, id: crate::ast::ExprId, kind: ExprKind) {
  file.exprs.get_mut(id.0).kind = kind;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::span::FileId;

  fn parse(src: &str) -> (File, SourceMap) {
    let mut map = SourceMap::new();
    let file_id: FileId = map.add("test.oo".into(), src.as_bytes().to_vec());
    let ast = crate::parser::parse_file(map.source(file_id), file_id).expect("parses");
    (ast, map)
  }

  #[test]
  fn drops_item_for_disabled_feature() {
    let (mut file, map) = parse("#[cc=\"debug\"]\nval a = 1\nval b = 2\n");
    assert_eq!(file.items.len(), 2);
    filter_cc(&mut file, &HashSet::new(), &map);
    assert_eq!(file.items.len(), 1);
  }

  #[test]
  fn keeps_item_for_enabled_feature() {
    let (mut file, map) = parse("#[cc=\"debug\"]\nval a = 1\n");
    let mut features = HashSet::new();
    features.insert("debug".to_string());
    filter_cc(&mut file, &features, &map);
    assert_eq!(file.items.len(), 1);
  }
}
