//! TypeScript AST and printer.

pub mod ast;
pub mod emit;

pub use ast::{
    ArrowBody, ClassMember, ImportItem, InterfaceMember, TsClass, TsConst, TsDoc, TsEnum, TsExpr,
    TsField, TsFunction, TsImport, TsInterface, TsItem, TsLiteral, TsMethod, TsModule, TsParam,
    TsProp, TsStmt, TsType, TsTypeAlias, VarKind,
};
pub use emit::Emit;
