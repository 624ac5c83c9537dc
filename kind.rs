//! Kind checking and coarse type resolution (spec §4.6).
//!
//! A type's *kind* is the arity of its type-level function: a plain
//! type has arity 0, and `type Pair = <a, b> => (a, b)` has arity 2.
//! Because every [`crate::ast::Type`] node lives flat in one arena per
//! file (`File::types`), checking "every `App*` node has the right
//! arity" is a single linear pass over that arena rather than a
//! recursive walk - the original's `ak_*` functions recurse the
//! pointer graph by hand; the arena makes that unnecessary here.
//!
//! An `App*`'s head is resolved against the file's already-built
//! [`Module`] (spec §4.5), the same binding table `use` resolution
//! merges cross-file imports into - so a type-level function imported
//! under a local alias kind-checks the same as one declared in this
//! file. Only a single, unqualified segment is resolvable this way; a
//! qualified `f` (`Id::Rooted`, or a multi-segment `Id::Local`) is
//! conservatively treated as arity-unknown and skipped, rather than
//! guessed at, mirroring the original's `id_kind_arity` only ever
//! being handed an already-resolved `AsgId`.
//!
//! A head that resolves to nothing, or to a binding that isn't
//! type-shaped (`val`/`fn`/`ffi_val`/a `use`-imported module), raises
//! [`KindError::BindingNotType`] - grounded in the original's
//! `binding_kind_arity`/`id_kind_arity` (`typecheck.c`), which raise
//! `OO_ERR_BINDING_NOT_TYPE` for exactly this case.

use crate::ast::{File, Id, ItemKind, Sid, TypeId, TypeKind};
use crate::binding::{Binding, Module};
use crate::error::KindError;
use crate::span::SourceMap;

/// The canonical, resolved representation of an item's type, computed
/// after kind checking succeeds. Plain types translate structurally;
/// function items are assembled from their (sid, type) argument list
/// and return type, since the syntax never writes their "type" out as
/// a single `Type` node the way `val`/`type` items do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OoType {
  Named(String),
  Ptr(Box<OoType>),
  PtrMut(Box<OoType>),
  Array(Box<OoType>),
  ProductAnon(Vec<OoType>),
  ProductNamed(Vec<(String, OoType)>),
  Fun { args: Vec<(String, OoType)>, ret: Box<OoType> },
  /// A type-level function that hasn't been applied; stands for the
  /// `Generic` syntax node itself, carrying its parameter count.
  Generic { arity: usize },
  /// Anything this coarse pass doesn't resolve further (sums,
  /// macro-produced types, applications) - later, out-of-scope passes
  /// refine these.
  Opaque,
}

/// The kind-relevant shape of a type binding: either a type-level
/// function with its bound parameter sids (for arity and named-order
/// checking), or a plain, arity-0 type.
enum BindingKind {
  Generic(Vec<Sid>),
  Plain,
}

/// Classifies `binding` for kind-checking purposes; `None` means it
/// isn't type-shaped at all (`binding_kind_arity`'s default case,
/// `OO_ERR_BINDING_NOT_TYPE`).
fn binding_kind(file: &File, binding: &Binding) -> Option<BindingKind> {
  match binding {
    Binding::Type(index) => match &file.items[*index].kind {
      ItemKind::Type { ty, .. } => match &file.ty(*ty).kind {
        TypeKind::Generic(params, _) => Some(BindingKind::Generic(params.clone())),
        _ => Some(BindingKind::Plain),
      },
      _ => Some(BindingKind::Plain),
    },
    Binding::Val(_) | Binding::Fun(_) | Binding::FfiVal(_) | Binding::Module(_) => None,
  }
}

/// Resolves an `App*`'s head `f` against `module` and checks it
/// against `found` (the number of arguments supplied), and - for a
/// named application - that the argument sids appear in the
/// function's declared parameter order.
fn check_app_head(
  file: &File,
  map: &SourceMap,
  module: &Module,
  f: &Id,
  found: usize,
  named_args: Option<&[(Sid, TypeId)]>,
  app_span: crate::span::Span,
  errors: &mut Vec<KindError>,
) {
  let sids = match f {
    Id::Local(sids, _) if sids.len() == 1 => sids,
    // A qualified or multi-segment head is arity-unknown; see module doc.
    _ => return,
  };
  let name = map.text(sids[0]);
  let kind = match module.get(name).and_then(|b| binding_kind(file, b)) {
    Some(kind) => kind,
    None => {
      errors.push(KindError::BindingNotType { span: f.span() });
      return;
    }
  };
  match kind {
    BindingKind::Plain => {
      if found != 0 {
        errors.push(KindError::WrongNumberOfTypeArgs { span: app_span, expected: 0, found });
      }
    }
    BindingKind::Generic(params) => {
      if params.len() != found {
        errors.push(KindError::WrongNumberOfTypeArgs { span: app_span, expected: params.len(), found });
      } else if let Some(named_args) = named_args {
        for (param, (sid, _)) in params.iter().zip(named_args.iter()) {
          if map.text(*param) != map.text(*sid) {
            errors.push(KindError::NamedTypeAppSid { span: app_span, sid: *sid });
          }
        }
      }
    }
  }
}

/// Checks every `AppAnon`/`AppNamed` node in `file` against its
/// resolved type-level function's arity, and that no argument is
/// itself a bare `Generic` (higher-order type arguments aren't
/// allowed).
pub fn check_file(file: &File, map: &SourceMap, module: &Module) -> Result<(), Vec<KindError>> {
  let mut errors = Vec::new();

  for ty in file.types.iter() {
    match &ty.kind {
      TypeKind::AppAnon(f, args) => {
        check_app_head(file, map, module, f, args.len(), None, ty.span, &mut errors);
        for arg in args {
          check_not_higher_order(file, *arg, &mut errors);
        }
      }
      TypeKind::AppNamed(f, named_args) => {
        check_app_head(file, map, module, f, named_args.len(), Some(named_args), ty.span, &mut errors);
        for (_, arg) in named_args {
          check_not_higher_order(file, *arg, &mut errors);
        }
      }
      _ => {}
    }
  }

  if errors.is_empty() {
    Ok(())
  } else {
    Err(errors)
  }
}

fn check_not_higher_order(file: &File, arg: TypeId, errors: &mut Vec<KindError>) {
  if let TypeKind::Generic(_, _) = &file.ty(arg).kind {
    errors.push(KindError::HigherOrderTypeArg { span: file.ty(arg).span });
  }
}

fn resolve_type(file: &File, id: TypeId, map: &SourceMap) -> OoType {
  match &file.ty(id).kind {
    TypeKind::Id(path) => OoType::Named(path_text(path, map)),
    TypeKind::Macro(_) => OoType::Opaque,
    TypeKind::Ptr(inner) => OoType::Ptr(Box::new(resolve_type(file, *inner, map))),
    TypeKind::PtrMut(inner) => OoType::PtrMut(Box::new(resolve_type(file, *inner, map))),
    TypeKind::Array(inner) => OoType::Array(Box::new(resolve_type(file, *inner, map))),
    TypeKind::ProductRepeated(_, _) => OoType::Opaque,
    TypeKind::ProductAnon(items) => {
      OoType::ProductAnon(items.iter().map(|t| resolve_type(file, *t, map)).collect())
    }
    TypeKind::ProductNamed(items) => OoType::ProductNamed(
      items.iter().map(|(sid, t)| (map.text(*sid).to_string(), resolve_type(file, *t, map))).collect(),
    ),
    TypeKind::FunAnon(args, ret) => OoType::Fun {
      args: args.iter().map(|t| (String::new(), resolve_type(file, *t, map))).collect(),
      ret: Box::new(resolve_type(file, *ret, map)),
    },
    TypeKind::FunNamed(args, ret) => OoType::Fun {
      args: args.iter().map(|(sid, t)| (map.text(*sid).to_string(), resolve_type(file, *t, map))).collect(),
      ret: Box::new(resolve_type(file, *ret, map)),
    },
    TypeKind::AppAnon(..) | TypeKind::AppNamed(..) => OoType::Opaque,
    TypeKind::Generic(params, _) => OoType::Generic { arity: params.len() },
    TypeKind::Sum { .. } => OoType::Opaque,
  }
}

fn path_text(id: &Id, map: &SourceMap) -> String {
  match id {
    Id::Local(sids, _) => sids.iter().map(|s| map.text(*s)).collect::<Vec<_>>().join("::"),
    Id::Rooted(root, sids, _) => {
      let root_name = match root {
        crate::ast::RootKw::Mod => "mod",
        crate::ast::RootKw::Dep => "dep",
        crate::ast::RootKw::Magic => "magic",
      };
      std::iter::once(root_name)
        .chain(sids.iter().map(|s| map.text(*s)))
        .collect::<Vec<_>>()
        .join("::")
    }
  }
}

/// Computes the coarse `OoType` for every item that has one: `type`
/// items resolve their aliased type directly; `fn` items are
/// assembled from their argument list and return type (spec §4.6,
/// "Coarse types"). `val`/`ffi_val`/`use`/`ffi_include` items carry no
/// syntactic type of their own at this layer and are skipped.
pub fn coarse_types(file: &File, map: &SourceMap) -> Vec<(usize, OoType)> {
  let mut out = Vec::new();
  for (index, item) in file.items.iter().enumerate() {
    match &item.kind {
      ItemKind::Type { ty, .. } => out.push((index, resolve_type(file, *ty, map))),
      ItemKind::Fun { args, ret, .. } => {
        let args = args.iter().map(|(sid, t)| (map.text(*sid).to_string(), resolve_type(file, *t, map))).collect();
        out.push((index, OoType::Fun { args, ret: Box::new(resolve_type(file, *ret, map)) }));
      }
      _ => {}
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(src: &str) -> (File, SourceMap, Module) {
    let mut map = SourceMap::new();
    let file_id = map.add("test.oo".into(), src.as_bytes().to_vec());
    let ast = crate::parser::parse_file(map.source(file_id), file_id).expect("parses");
    let module = crate::binding::build_module(&ast, &map).expect("binds");
    (ast, map, module)
  }

  #[test]
  fn correct_arity_application_passes() {
    let (file, map, module) = parse("type Pair = <a, b> => (a, b)\ntype X = Pair<I32, I32>\n");
    assert!(check_file(&file, &map, &module).is_ok());
  }

  #[test]
  fn wrong_arity_application_is_rejected() {
    let (file, map, module) = parse("type Pair = <a, b> => (a, b)\ntype X = Pair<I32>\n");
    let errors = check_file(&file, &map, &module).unwrap_err();
    assert!(matches!(errors[0], KindError::WrongNumberOfTypeArgs { expected: 2, found: 1, .. }));
  }

  #[test]
  fn named_application_checks_field_order() {
    let (file, map, module) = parse("type Pair = <a, b> => (a: a, b: b)\ntype X = Pair<b = I32, a = I64>\n");
    let errors = check_file(&file, &map, &module).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, KindError::NamedTypeAppSid { .. })));
  }

  #[test]
  fn application_head_resolving_to_non_type_is_rejected() {
    let (file, map, module) = parse("val Pair = 1\ntype X = Pair<I32>\n");
    let errors = check_file(&file, &map, &module).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, KindError::BindingNotType { .. })));
  }

  #[test]
  fn application_head_that_is_undefined_is_rejected() {
    let (file, map, module) = parse("type X = Pair<I32>\n");
    let errors = check_file(&file, &map, &module).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, KindError::BindingNotType { .. })));
  }

  #[test]
  fn application_against_non_generic_type_checks_zero_arity() {
    let (file, map, module) = parse("type Foo = I32\ntype X = Foo<I32>\n");
    let errors = check_file(&file, &map, &module).unwrap_err();
    assert!(matches!(errors[0], KindError::WrongNumberOfTypeArgs { expected: 0, found: 1, .. }));
  }

  #[test]
  fn coarse_type_of_fn_assembles_signature() {
    let (file, map, _module) = parse("fn add = (a: I32, b: I32) -> I32 { a }\n");
    let types = coarse_types(&file, &map);
    assert_eq!(types.len(), 1);
    match &types[0].1 {
      OoType::Fun { args, ret } => {
        assert_eq!(args.len(), 2);
        assert_eq!(**ret, OoType::Named("I32".to_string()));
      }
      other => panic!("expected a function type, got {other:?}"),
    }
  }
}
