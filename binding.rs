//! Per-file binding tables (spec §4.5): a mapping from simple
//! identifier to the item it names, plus cross-file `use` resolution.
//!
//! The original leaves `use` resolution as a stub (`oo_init_item_maps`
//! in `analyze.c` has a `// TODO impl` for `ITEM_USE` and just prints a
//! debug line); everything past [`build_module`]'s duplicate-id
//! detection is a from-scratch design rather than ported source (see
//! `DESIGN.md`).
//!
//! Like the original's `items_by_sid`/`pub_items_by_sid` (backed by a
//! `rax` radix tree), we use an ordered mapping - here `HashMap`, since
//! nothing downstream depends on key order.

use std::collections::HashMap;

use crate::ast::{ExprKind, File, Id, ItemKind, PatternKind, RootKw, Sid, SummandKind, TypeKind, UseTree, UseTreeKind};
use crate::context::Context;
use crate::error::{BindingError, ImportError, OoError};
use crate::span::{FileId, SourceMap, Span};

/// What a simple identifier in a file's own table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
  Type(usize),
  Val(usize),
  Fun(usize),
  FfiVal(usize),
  /// A `use mod::…`/`use dep::…` import: the whole target file,
  /// bound as a namespace value under the importer's chosen name.
  Module(FileId),
}

/// One file's worth of name bindings: every binding, and the subset
/// that's `pub` and therefore importable from elsewhere.
#[derive(Debug, Default)]
pub struct Module {
  by_sid: HashMap<String, (Span, Binding)>,
  pub_by_sid: HashMap<String, (Span, Binding)>,
}

impl Module {
  pub fn get(&self, name: &str) -> Option<&Binding> {
    self.by_sid.get(name).map(|(_, b)| b)
  }

  pub fn get_pub(&self, name: &str) -> Option<&Binding> {
    self.pub_by_sid.get(name).map(|(_, b)| b)
  }

  /// Adds a binding, failing with the first-seen span if `name` is
  /// already bound (spec §3 invariant: `items_by_sid` is a function).
  pub fn insert(&mut self, name: String, span: Span, binding: Binding) -> Result<(), Span> {
    if let Some((first, _)) = self.by_sid.get(&name) {
      return Err(*first);
    }
    self.by_sid.insert(name, (span, binding));
    Ok(())
  }

  fn insert_pub(&mut self, name: &str, span: Span, binding: Binding) {
    self.pub_by_sid.insert(name.to_string(), (span, binding));
  }
}

/// Builds `items_by_sid`/`pub_items_by_sid` for one already-loaded,
/// already-CC-filtered file. `use` items are skipped here (they carry
/// no `sid` of their own to register until resolved - see
/// [`resolve_use_items`]); `ffi_include` never binds, matching the
/// original.
pub fn build_module(file: &File, map: &SourceMap) -> Result<Module, Vec<BindingError>> {
  let mut module = Module::default();
  let mut errors = Vec::new();

  for (index, item) in file.items.iter().enumerate() {
    let (sid, binding) = match &item.kind {
      ItemKind::Type { sid, .. } => (*sid, Binding::Type(index)),
      ItemKind::Val { sid, .. } => (*sid, Binding::Val(index)),
      ItemKind::Fun { sid, .. } => (*sid, Binding::Fun(index)),
      ItemKind::FfiVal { sid, .. } => (*sid, Binding::FfiVal(index)),
      ItemKind::Use(_) | ItemKind::FfiInclude { .. } => continue,
    };
    let name = map.text(sid).to_string();
    match module.insert(name.clone(), sid, binding) {
      Ok(()) => {
        if item.is_pub {
          module.insert_pub(&name, sid, binding);
        }
      }
      Err(first) => errors.push(BindingError::DuplicateId { sid, first }),
    }
  }

  errors.extend(check_duplicate_fields(file, map));

  if errors.is_empty() {
    Ok(module)
  } else {
    Err(errors)
  }
}

/// Checks that `sids` are pairwise unique, blaming each repeat on the
/// span it first appeared at (spec §3: "`sids` within the same product
/// are pairwise unique").
fn check_unique_sids(sids: impl Iterator<Item = Sid>, map: &SourceMap, errors: &mut Vec<BindingError>) {
  let mut seen: HashMap<&str, Span> = HashMap::new();
  for sid in sids {
    let name = map.text(sid);
    match seen.get(name) {
      Some(&first) => errors.push(BindingError::DuplicateField { sid, first }),
      None => {
        seen.insert(name, sid);
      }
    }
  }
}

/// Walks every `ProductNamed`/`SummandNamed`/`FunNamed`/`AppNamed` (and
/// a named `fn` item's argument list) in `file`, checking field-name
/// uniqueness within each one (spec §3). The parser never enforces
/// this itself, so it falls to the binding phase.
fn check_duplicate_fields(file: &File, map: &SourceMap) -> Vec<BindingError> {
  let mut errors = Vec::new();

  for item in &file.items {
    if let ItemKind::Fun { args, .. } = &item.kind {
      check_unique_sids(args.iter().map(|(sid, _)| *sid), map, &mut errors);
    }
  }

  for ty in file.types.iter() {
    match &ty.kind {
      TypeKind::ProductNamed(items) => check_unique_sids(items.iter().map(|(sid, _)| *sid), map, &mut errors),
      TypeKind::FunNamed(args, _) => check_unique_sids(args.iter().map(|(sid, _)| *sid), map, &mut errors),
      TypeKind::AppNamed(_, named_args) => {
        check_unique_sids(named_args.iter().map(|(sid, _)| *sid), map, &mut errors)
      }
      TypeKind::Sum { summands, .. } => {
        for summand in summands {
          if let SummandKind::Named(items) = &summand.kind {
            check_unique_sids(items.iter().map(|(sid, _)| *sid), map, &mut errors);
          }
        }
      }
      _ => {}
    }
  }

  for expr in file.exprs.iter() {
    match &expr.kind {
      ExprKind::ProductNamed(items) => check_unique_sids(items.iter().map(|(sid, _)| *sid), map, &mut errors),
      ExprKind::FunAppNamed(_, named_args) => {
        check_unique_sids(named_args.iter().map(|(sid, _)| *sid), map, &mut errors)
      }
      _ => {}
    }
  }

  for pattern in file.patterns.iter() {
    match &pattern.kind {
      PatternKind::ProductNamed(items) => check_unique_sids(items.iter().map(|(sid, _)| *sid), map, &mut errors),
      PatternKind::SummandNamed(_, items) => check_unique_sids(items.iter().map(|(sid, _)| *sid), map, &mut errors),
      _ => {}
    }
  }

  errors
}

/// Flattens one `use` item's tree into `(local_name, chain)` pairs,
/// one per leaf/rename, carrying the full `::`-separated sid chain
/// from the tree's root down to that leaf.
fn flatten_use_tree(tree: &UseTree, prefix: &mut Vec<Sid>, out: &mut Vec<(Sid, Vec<Sid>)>) {
  prefix.push(tree.sid);
  match &tree.kind {
    UseTreeKind::Leaf => out.push((tree.sid, prefix.clone())),
    UseTreeKind::Rename(to) => out.push((*to, prefix.clone())),
    UseTreeKind::Branch(children) => {
      for child in children {
        flatten_use_tree(child, prefix, out);
      }
    }
  }
  prefix.pop();
}

/// Resolves every `use` item in `file_id`, returning `(local_name,
/// span-to-blame-on-duplicate, binding)` triples ready to merge into
/// that file's own [`Module`].
///
/// Two chain shapes are recognised:
/// - Rooted in `mod`/`dep` (e.g. `use mod::a::b`): the whole chain is
///   a file path (`Context::resolve_path`); the file is loaded on
///   demand and bound as `Binding::Module`.
/// - A bare local chain (e.g. `use a::X`): `a` must already be bound
///   (by an earlier `use mod::…`) to a `Module` in *this* file; `X` is
///   then looked up in that target's `pub`-only table, enforcing
///   visibility across the file boundary.
pub fn resolve_use_items(ctx: &mut Context, file_id: FileId) -> Result<Vec<(String, Span, Binding)>, Vec<OoError>> {
  let use_trees: Vec<UseTree> = ctx
    .file(file_id)
    .items
    .iter()
    .filter_map(|item| match &item.kind {
      ItemKind::Use(tree) => Some(tree.clone()),
      _ => None,
    })
    .collect();

  let mut out = Vec::new();
  let mut errors = Vec::new();

  for tree in &use_trees {
    let mut leaves = Vec::new();
    flatten_use_tree(tree, &mut Vec::new(), &mut leaves);

    for (local_sid, chain) in leaves {
      let local_name = ctx.source_map().text(local_sid).to_string();
      match resolve_chain(ctx, file_id, &chain) {
        Ok(binding) => out.push((local_name, local_sid, binding)),
        Err(e) => errors.push(e),
      }
    }
  }

  if errors.is_empty() {
    Ok(out)
  } else {
    Err(errors)
  }
}

fn resolve_chain(ctx: &mut Context, file_id: FileId, chain: &[Span]) -> Result<Binding, OoError> {
  let root_text = ctx.source_map().text(chain[0]).to_string();

  if root_text == "mod" || root_text == "dep" {
    if chain.len() < 2 {
      return Err(OoError::from(ImportError::EmptyPath { span: chain[0] }));
    }
    let root_kw = if root_text == "mod" { RootKw::Mod } else { RootKw::Dep };
    let span = Span::new(chain[0].file, chain[0].start, chain.last().unwrap().end() - chain[0].start);
    let id = Id::Rooted(root_kw, chain[1..].to_vec(), span);
    let target = ctx.load_id(&id)?;
    return Ok(Binding::Module(target));
  }

  let first_name = root_text;
  let own = ctx.module(file_id).expect("own module built before uses are resolved");
  let mut current = *own.get(&first_name).ok_or(OoError::from(BindingError::Unresolved { sid: chain[0] }))?;

  for seg in &chain[1..] {
    let target_file = match current {
      Binding::Module(f) => f,
      _ => return Err(OoError::from(BindingError::Unresolved { sid: *seg })),
    };
    let seg_name = ctx.source_map().text(*seg).to_string();
    let target_module = ctx.module(target_file).expect("target file bound before its uses are consumed");
    current = match target_module.get_pub(&seg_name) {
      Some(b) => *b,
      None => {
        if target_module.get(&seg_name).is_some() {
          return Err(OoError::from(BindingError::NotPublic { sid: *seg, definition: *seg }));
        }
        return Err(OoError::from(BindingError::Unresolved { sid: *seg }));
      }
    };
  }

  Ok(current)
}

/// A `magic::…` identifier, resolved against the closed table of
/// compiler intrinsics this front-end knows about (spec §9: the
/// original references `magic::` ids but never implements their
/// resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicItem {
  /// `magic::type_name` - the stringified name of a type, filled in by
  /// a later (out-of-scope) codegen pass.
  TypeName,
  /// `magic::source_location` - the call site's span, similarly
  /// materialised later.
  SourceLocation,
}

pub fn resolve_magic(id: &Id, map: &SourceMap) -> Result<MagicItem, ImportError> {
  let (sids, span) = match id {
    Id::Rooted(RootKw::Magic, sids, span) => (sids, *span),
    _ => return Err(ImportError::NotRootedInModOrDep { span: id.span() }),
  };
  if sids.len() != 1 {
    return Err(ImportError::UnknownMagic { span });
  }
  match map.text(sids[0]) {
    "type_name" => Ok(MagicItem::TypeName),
    "source_location" => Ok(MagicItem::SourceLocation),
    _ => Err(ImportError::UnknownMagic { span }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::span::FileId as Fid;

  fn parse(src: &str) -> (File, SourceMap) {
    let mut map = SourceMap::new();
    let file_id: Fid = map.add("test.oo".into(), src.as_bytes().to_vec());
    let ast = crate::parser::parse_file(map.source(file_id), file_id).expect("parses");
    (ast, map)
  }

  #[test]
  fn binds_top_level_items() {
    let (file, map) = parse("val a = 1\ntype B = I32\n");
    let module = build_module(&file, &map).unwrap();
    assert!(matches!(module.get("a"), Some(Binding::Val(0))));
    assert!(matches!(module.get("B"), Some(Binding::Type(1))));
  }

  #[test]
  fn duplicate_top_level_id_is_rejected() {
    let (file, map) = parse("type a = I32\ntype a = I64\n");
    let errors = build_module(&file, &map).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], BindingError::DuplicateId { .. }));
  }

  #[test]
  fn magic_resolves_known_intrinsics_only() {
    let (_file, map) = parse("type_name\nbogus\n");
    let known = Span::new(FileId(0), 0, 9);
    let unknown = Span::new(FileId(0), 10, 5);
    let id_known = Id::Rooted(RootKw::Magic, vec![known], known);
    let id_unknown = Id::Rooted(RootKw::Magic, vec![unknown], unknown);
    assert_eq!(resolve_magic(&id_known, &map), Ok(MagicItem::TypeName));
    assert!(matches!(resolve_magic(&id_unknown, &map), Err(ImportError::UnknownMagic { .. })));
  }

  #[test]
  fn duplicate_field_in_named_product_type_is_rejected() {
    let (file, map) = parse("type P = (a: I32, a: I64)\n");
    let errors = build_module(&file, &map).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], BindingError::DuplicateField { .. }));
  }

  #[test]
  fn duplicate_field_in_named_product_expr_is_rejected() {
    let (file, map) = parse("val p = (a = 1, a = 2)\n");
    let errors = build_module(&file, &map).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], BindingError::DuplicateField { .. }));
  }

  #[test]
  fn distinct_fields_in_named_product_are_accepted() {
    let (file, map) = parse("type P = (a: I32, b: I64)\n");
    assert!(build_module(&file, &map).is_ok());
  }

  #[test]
  fn pub_subset_only_contains_pub_items() {
    let (file, map) = parse("pub val a = 1\nval b = 2\n");
    let module = build_module(&file, &map).unwrap();
    assert!(module.get_pub("a").is_some());
    assert!(module.get_pub("b").is_none());
    assert!(module.get("b").is_some());
  }
}
