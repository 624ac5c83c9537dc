//! The abstract syntax graph (ASG) produced by the parser (`parser/mod.rs`)
//! and consumed by every later phase (`cc.rs`, `binding.rs`, `kind.rs`).
//!
//! Every node carries a [`Span`] so diagnostics can point back into the
//! source it was parsed from. Where the C original (`asg.h`) used
//! parallel stretchy buffers (e.g. `AsgType *types` alongside
//! `AsgSid *sids` of the same length) we collapse them into a single
//! `Vec<(Sid, T)>` (spec §9, "Parallel lists"). Where it used raw
//! pointers into a bump allocator we use arena indices (spec §9, "Arena
//! ownership") via the typed indices in [`arena`].

pub mod arena;

use crate::span::Span;
pub use arena::{Arena, ExprId, PatternId, RepeatId, TypeId};

/// A bare identifier's source span; the text is read back out of the
/// owning `SourceMap` on demand rather than copied.
pub type Sid = Span;

/// A possibly-qualified path such as `mod::a::b` or a plain local `b`.
/// The keyword that roots a qualified path is split out explicitly
/// (spec §9, "Keyword segments in Id") instead of being just another
/// segment, since `mod`/`dep`/`magic` are reserved words and can't
/// collide with a user `Sid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Id {
  Local(Vec<Sid>, Span),
  Rooted(RootKw, Vec<Sid>, Span),
}

impl Id {
  pub fn span(&self) -> Span {
    match self {
      Id::Local(_, span) => *span,
      Id::Rooted(_, _, span) => *span,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKw {
  Mod,
  Dep,
  Magic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroInv {
  pub span: Span,
  pub name: Span,
  pub args: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
  Int,
  Float,
  String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
  pub span: Span,
  pub kind: LiteralKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Shl,
  Shr,
  BitOr,
  BitAnd,
  BitXor,
  And,
  Or,
  Eq,
  Ne,
  Gt,
  Ge,
  Lt,
  Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
  Assign,
  AddAssign,
  SubAssign,
  MulAssign,
  DivAssign,
  ModAssign,
  BitAndAssign,
  BitOrAssign,
  BitXorAssign,
  ShlAssign,
  ShrAssign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatKind {
  Int(Span),
  Macro(MacroInv),
  SizeOf(TypeId),
  AlignOf(TypeId),
  BinOp(BinOp, RepeatId, RepeatId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
  pub span: Span,
  pub kind: RepeatKind,
}

// --- Meta (attributes, e.g. `#[cc="feature"]`) ------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaKind {
  Nullary,
  Unary(Literal),
  Nested(Vec<Meta>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
  pub span: Span,
  pub name: Span,
  pub kind: MetaKind,
}

impl Meta {
  pub fn name_str<'a>(&self, map: &'a crate::span::SourceMap) -> &'a str {
    map.text(self.name)
  }
}

// --- Use trees ----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseTreeKind {
  Leaf,
  Rename(Sid),
  Branch(Vec<UseTree>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseTree {
  pub span: Span,
  pub sid: Sid,
  pub kind: UseTreeKind,
}

// --- Types ----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
  Id(Id),
  Macro(MacroInv),
  Ptr(TypeId),
  PtrMut(TypeId),
  Array(TypeId),
  ProductRepeated(TypeId, Repeat),
  ProductAnon(Vec<TypeId>),
  ProductNamed(Vec<(Sid, TypeId)>),
  FunAnon(Vec<TypeId>, TypeId),
  FunNamed(Vec<(Sid, TypeId)>, TypeId),
  /// Type-level function application with positional arguments, e.g.
  /// `list(int)`.
  AppAnon(Id, Vec<TypeId>),
  /// Type-level function application with named arguments.
  AppNamed(Id, Vec<(Sid, TypeId)>),
  /// `for(T) T*` style generic binder. `args` are the bound
  /// type-level parameters; arity for kind-checking is `args.len()`.
  Generic(Vec<Sid>, TypeId),
  Sum {
    is_pub: bool,
    summands: Vec<Summand>,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
  pub span: Span,
  pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummandKind {
  Anon(Vec<TypeId>),
  Named(Vec<(Sid, TypeId)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summand {
  pub span: Span,
  pub sid: Sid,
  pub kind: SummandKind,
}

// --- Patterns ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
  Id {
    is_mut: bool,
    sid: Sid,
    ty: Option<TypeId>,
  },
  Blank,
  Literal(Literal),
  Ptr(PatternId),
  ProductAnon(Vec<PatternId>),
  ProductNamed(Vec<(Sid, PatternId)>),
  SummandAnon(Id, Vec<PatternId>),
  SummandNamed(Id, Vec<(Sid, PatternId)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
  pub span: Span,
  pub kind: PatternKind,
}

// --- Blocks and expressions -------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStmt {
  pub attrs: Vec<Meta>,
  pub expr: ExprId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
  pub stmts: Vec<BlockStmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
  Id(Id),
  Macro(MacroInv),
  Literal(Literal),
  Ref(ExprId),
  RefMut(ExprId),
  Deref(ExprId),
  DerefMut(ExprId),
  /// Array literal; the C original stores this as a single child
  /// pointer (one element) rather than a list - kept as-is here since
  /// nothing downstream in this crate's scope needs multi-element array
  /// literals (grounded in `asg.h`'s `AsgExp *array` field).
  Array(ExprId),
  ArrayIndex(ExprId, ExprId),
  ProductRepeated(ExprId, Repeat),
  ProductAnon(Vec<ExprId>),
  ProductNamed(Vec<(Sid, ExprId)>),
  ProductAccessAnon(ExprId, u64),
  ProductAccessNamed(ExprId, Sid),
  FunAppAnon(ExprId, Vec<ExprId>),
  FunAppNamed(ExprId, Vec<(Sid, ExprId)>),
  Cast(ExprId, TypeId),
  SizeOf(TypeId),
  AlignOf(TypeId),
  Not(ExprId),
  Negate(ExprId),
  BinOp(BinOp, ExprId, ExprId),
  Assign(AssignOp, ExprId, ExprId),
  Val(Pattern),
  ValAssign(Pattern, ExprId),
  Block(Block),
  If {
    cond: ExprId,
    if_block: Block,
    else_block: Block,
  },
  While {
    cond: ExprId,
    block: Block,
  },
  Case {
    matcher: ExprId,
    arms: Vec<(Pattern, Block)>,
  },
  Loop {
    matcher: ExprId,
    arms: Vec<(Pattern, Block)>,
  },
  Return(ExprId),
  Break(ExprId),
  Goto(Sid),
  Label(Sid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
  pub span: Span,
  pub kind: ExprKind,
}

// --- Items --------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
  Use(UseTree),
  Type {
    sid: Sid,
    ty: TypeId,
  },
  Val {
    is_mut: bool,
    sid: Sid,
    expr: ExprId,
  },
  /// Unlike `Val`, a function item needs no separate type annotation:
  /// its signature is reconstructed from `arg_types`/`ret`.
  Fun {
    sid: Sid,
    type_args: Vec<Sid>,
    args: Vec<(Sid, TypeId)>,
    ret: TypeId,
    body: Block,
  },
  FfiInclude {
    include: Span,
  },
  FfiVal {
    is_mut: bool,
    sid: Sid,
    ty: TypeId,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
  pub span: Span,
  pub is_pub: bool,
  pub attrs: Vec<Meta>,
  pub kind: ItemKind,
}

impl Item {
  pub fn sid(&self) -> Option<Sid> {
    match &self.kind {
      ItemKind::Type { sid, .. }
      | ItemKind::Val { sid, .. }
      | ItemKind::Fun { sid, .. }
      | ItemKind::FfiVal { sid, .. } => Some(*sid),
      ItemKind::Use(_) | ItemKind::FfiInclude { .. } => None,
    }
  }
}

/// The per-file ASG root (`AsgFile` in the original): one file's worth
/// of items plus the arenas their type/expr/pattern/repeat nodes were
/// allocated into. Binding tables are layered on top in `binding.rs`
/// rather than stored inline, since they are derived data rather than
/// syntax.
#[derive(Debug, Default)]
pub struct File {
  pub items: Vec<Item>,
  pub types: Arena<Type>,
  pub exprs: Arena<Expr>,
  pub patterns: Arena<Pattern>,
  pub repeats: Arena<Repeat>,
}

impl File {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn ty(&self, id: TypeId) -> &Type {
    self.types.get(id.0)
  }

  pub fn expr(&self, id: ExprId) -> &Expr {
    self.exprs.get(id.0)
  }

  pub fn pattern(&self, id: PatternId) -> &Pattern {
    self.patterns.get(id.0)
  }

  pub fn repeat(&self, id: RepeatId) -> &Repeat {
    self.repeats.get(id.0)
  }
}
