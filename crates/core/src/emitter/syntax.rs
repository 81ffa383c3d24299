//! Version-gated syntax variants, selected once per run from the policy.

use crate::policy::GenerationPolicy;
use crate::ts::{ArrowBody, Emit, ImportItem, TsExpr, TsImport, TsType};

/// TypeScript language level of the emitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsSyntax {
    /// Before 2.0: no `null`/`undefined` types, no non-null assertions.
    Legacy,
    /// 2.0 up to 2.7: strict null types.
    StrictNulls,
    /// 2.7 and later: required class fields are declared `name!: T`.
    DefiniteAssignment,
}

impl TsSyntax {
    /// Language level for a `typescript_version` token.
    pub fn from_version(version: f64) -> Self {
        if version < 2.0 {
            TsSyntax::Legacy
        } else if version < 2.7 {
            TsSyntax::StrictNulls
        } else {
            TsSyntax::DefiniteAssignment
        }
    }

    /// Whether `null`/`undefined` may appear in type positions.
    pub fn has_null_types(self) -> bool {
        self != TsSyntax::Legacy
    }

    /// `T | undefined` where the language has it.
    pub fn optional(self, ty: TsType) -> TsType {
        if self.has_null_types() {
            TsType::union([ty, TsType::Undefined])
        } else {
            ty
        }
    }

    /// `T | null` where the language has it.
    pub fn nullable(self, ty: TsType) -> TsType {
        if self.has_null_types() {
            TsType::union([ty, TsType::Null])
        } else {
            ty
        }
    }

    /// Non-null assertion operator.
    pub fn non_null(self) -> &'static str {
        if self.has_null_types() { "!" } else { "" }
    }

    /// Whether required class fields take a `!` definite-assignment marker.
    pub fn definite_fields(self) -> bool {
        self == TsSyntax::DefiniteAssignment
    }
}

/// RxJS call shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxFlavor {
    /// Before 6: prototype-patching operators (`rxjs/add/...`) and `Observable.of`.
    PrototypePatch,
    /// 6.x: pipeable operators, `throwError(error)`.
    Pipeable,
    /// 7 and later: pipeable operators, `throwError(() => error)`.
    PipeableThrowFactory,
}

impl RxFlavor {
    /// Call shapes for an `rxjs_version` token.
    pub fn from_version(version: f64) -> Self {
        if version < 6.0 {
            RxFlavor::PrototypePatch
        } else if version < 7.0 {
            RxFlavor::Pipeable
        } else {
            RxFlavor::PipeableThrowFactory
        }
    }

    /// `source.pipe(_observableMergeMap(f))` or `source.flatMap(f)`.
    pub fn merge_map(self, source: TsExpr, f: TsExpr) -> TsExpr {
        match self {
            RxFlavor::PrototypePatch => source.method("flatMap", vec![f]),
            _ => source.method("pipe", vec![TsExpr::call("_observableMergeMap", vec![f])]),
        }
    }

    /// `source.pipe(_observableCatch(f))` or `source.catch(f)`.
    pub fn catch_error(self, source: TsExpr, f: TsExpr) -> TsExpr {
        match self {
            RxFlavor::PrototypePatch => source.method("catch", vec![f]),
            _ => source.method("pipe", vec![TsExpr::call("_observableCatch", vec![f])]),
        }
    }

    /// Observable emitting `value` once.
    pub fn of(self, value: TsExpr, ty: Option<&TsType>) -> TsExpr {
        let type_args = ty.map(|t| format!("<{}>", t.emit())).unwrap_or_default();
        let callee = match self {
            RxFlavor::PrototypePatch => format!("Observable.of{type_args}"),
            _ => format!("_observableOf{type_args}"),
        };
        TsExpr::call(callee, vec![value])
    }

    /// Observable erroring with `error`.
    pub fn throw(self, error: TsExpr) -> TsExpr {
        match self {
            RxFlavor::PrototypePatch => TsExpr::call("Observable.throw", vec![error]),
            RxFlavor::Pipeable => TsExpr::call("_observableThrow", vec![error]),
            RxFlavor::PipeableThrowFactory => TsExpr::call(
                "_observableThrow",
                vec![TsExpr::Arrow {
                    params: Vec::new(),
                    body: ArrowBody::Expr(Box::new(error)),
                }],
            ),
        }
    }

    /// Import declarations the call shapes rely on.
    pub fn imports(self) -> Vec<TsImport> {
        match self {
            RxFlavor::PrototypePatch => vec![
                TsImport::side_effect("rxjs/add/observable/of"),
                TsImport::side_effect("rxjs/add/observable/throw"),
                TsImport::side_effect("rxjs/add/operator/mergeMap"),
                TsImport::side_effect("rxjs/add/operator/catch"),
                TsImport::new("rxjs/Observable", vec![ImportItem::plain("Observable")]),
            ],
            RxFlavor::Pipeable | RxFlavor::PipeableThrowFactory => vec![
                TsImport::new(
                    "rxjs/operators",
                    vec![
                        ImportItem::aliased("mergeMap", "_observableMergeMap"),
                        ImportItem::aliased("catchError", "_observableCatch"),
                    ],
                ),
                TsImport::new(
                    "rxjs",
                    vec![
                        ImportItem::plain("Observable"),
                        ImportItem::aliased("throwError", "_observableThrow"),
                        ImportItem::aliased("of", "_observableOf"),
                    ],
                ),
            ],
        }
    }
}

/// Both syntax selections of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    /// TypeScript language level.
    pub ts: TsSyntax,
    /// RxJS call shapes.
    pub rx: RxFlavor,
}

impl Syntax {
    /// Selections for `policy`.
    pub fn from_policy(policy: &GenerationPolicy) -> Self {
        Self {
            ts: TsSyntax::from_version(policy.typescript_version),
            rx: RxFlavor::from_version(policy.rxjs_version),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ts_syntax_thresholds() {
        assert_eq!(TsSyntax::from_version(1.8), TsSyntax::Legacy);
        assert_eq!(TsSyntax::from_version(2.0), TsSyntax::StrictNulls);
        assert_eq!(TsSyntax::from_version(2.6), TsSyntax::StrictNulls);
        assert_eq!(TsSyntax::from_version(2.7), TsSyntax::DefiniteAssignment);
        assert_eq!(TsSyntax::from_version(5.4), TsSyntax::DefiniteAssignment);
    }

    #[test]
    fn test_rx_flavor_thresholds() {
        assert_eq!(RxFlavor::from_version(5.5), RxFlavor::PrototypePatch);
        assert_eq!(RxFlavor::from_version(6.0), RxFlavor::Pipeable);
        assert_eq!(RxFlavor::from_version(6.6), RxFlavor::Pipeable);
        assert_eq!(RxFlavor::from_version(7.0), RxFlavor::PipeableThrowFactory);
    }

    #[test]
    fn test_optional_types() {
        assert_eq!(TsSyntax::Legacy.optional(TsType::String).emit(), "string");
        assert_eq!(
            TsSyntax::StrictNulls.optional(TsType::String).emit(),
            "string | undefined"
        );
        assert_eq!(TsSyntax::DefiniteAssignment.nullable(TsType::Number).emit(), "number | null");
    }

    #[test]
    fn test_rx_call_shapes() {
        let src = TsExpr::ident("source");
        let f = TsExpr::ident("f");
        assert_eq!(
            RxFlavor::PrototypePatch.merge_map(src.clone(), f.clone()).emit(),
            "source.flatMap(f)"
        );
        assert_eq!(
            RxFlavor::Pipeable.merge_map(src.clone(), f.clone()).emit(),
            "source.pipe(_observableMergeMap(f))"
        );
        assert_eq!(
            RxFlavor::Pipeable.catch_error(src, f).emit(),
            "source.pipe(_observableCatch(f))"
        );
    }

    #[test]
    fn test_rx_throw_and_of() {
        let e = TsExpr::ident("e");
        assert_eq!(RxFlavor::PrototypePatch.throw(e.clone()).emit(), "Observable.throw(e)");
        assert_eq!(RxFlavor::Pipeable.throw(e.clone()).emit(), "_observableThrow(e)");
        assert_eq!(
            RxFlavor::PipeableThrowFactory.throw(e).emit(),
            "_observableThrow(() => e)"
        );
        assert_eq!(
            RxFlavor::Pipeable
                .of(TsExpr::raw("null as any"), Some(&TsType::Void))
                .emit(),
            "_observableOf<void>(null as any)"
        );
    }
}
