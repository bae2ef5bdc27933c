//! Syntax kinds for the C# concrete syntax tree
//!
//! One flat enum covers trivia, tokens, and structure nodes so the same kind
//! type can be used for rowan tokens and nodes. Variants are laid out in
//! groups (trivia first, then tokens, then nodes) and must stay contiguous:
//! `CsLanguage::kind_from_raw` relies on the representation.

/// All token and node kinds known to the C# CST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum CsSyntaxKind {
    // === Trivia ===
    Whitespace = 0,
    Newline,
    CommentLine,
    CommentBlock,
    /// `#region` directive with its free-text label, line terminator excluded
    RegionStart,
    /// `#endregion` directive, line terminator excluded
    RegionEnd,
    /// Any other preprocessor directive (`#if`, `#pragma`, ...)
    Directive,

    // === Identifiers and literals ===
    Ident,
    IntLiteral,
    RealLiteral,
    CharLiteral,
    StringLiteral,
    /// `@"..."` (may span lines, `""` escapes)
    VerbatimString,
    /// `$"..."`, `$@"..."` or `@$"..."` (holes are not tokenized as code)
    InterpolatedString,

    // === Reserved keywords ===
    AbstractKw,
    AsKw,
    BaseKw,
    BoolKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    CheckedKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DecimalKw,
    DefaultKw,
    DelegateKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    EventKw,
    ExplicitKw,
    ExternKw,
    FalseKw,
    FinallyKw,
    FixedKw,
    FloatKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    IntKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LockKw,
    LongKw,
    NamespaceKw,
    NewKw,
    NullKw,
    ObjectKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SbyteKw,
    SealedKw,
    ShortKw,
    SizeofKw,
    StackallocKw,
    StaticKw,
    StringKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    TypeofKw,
    UintKw,
    UlongKw,
    UncheckedKw,
    UnsafeKw,
    UshortKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // === Punctuation and operators ===
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    ColonColon,
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    QuestionDot,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    EqEq,
    BangEq,
    FatArrow,
    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Arrow,
    Star,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Amp,
    AmpAmp,
    AmpEq,
    Pipe,
    PipePipe,
    PipeEq,
    Caret,
    CaretEq,
    Bang,
    Tilde,
    Shl,
    ShlEq,

    // === Structure nodes ===
    CompilationUnit,
    UsingDirective,
    NamespaceDecl,
    QualifiedName,
    AttributeList,
    TypeDecl,
    TypeParamList,
    TypeParam,
    BaseList,
    EnumMember,
    FieldDecl,
    MethodDecl,
    PropertyDecl,
    EventDecl,
    AccessorList,
    ParamList,
    Param,
    Block,
    LocalDeclStmt,
    ExprStmt,
    EmptyStmt,
    IfStmt,
    ElseClause,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForeachStmt,
    SwitchStmt,
    TryStmt,
    CatchClause,
    FinallyClause,
    UsingStmt,
    ReturnStmt,
    ThrowStmt,
    BreakStmt,
    ContinueStmt,
    GotoStmt,
    LockStmt,
    /// A run of expression tokens the builder does not model further
    Expr,
    /// A declaring identifier
    Name,
    /// A referencing identifier
    NameRef,

    // === Special ===
    Error,
    Eof,
}

use CsSyntaxKind::*;

impl CsSyntaxKind {
    /// Whitespace, newlines, comments, and preprocessor directives.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Whitespace | Newline | CommentLine | CommentBlock | RegionStart | RegionEnd | Directive
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, CommentLine | CommentBlock)
    }

    pub fn is_region_directive(self) -> bool {
        matches!(self, RegionStart | RegionEnd)
    }

    pub fn is_keyword(self) -> bool {
        (self >= AbstractKw) && (self <= WhileKw)
    }

    pub fn is_node(self) -> bool {
        (self >= CompilationUnit) && (self <= NameRef)
    }

    /// Built-in type keywords usable in type positions.
    pub fn is_predefined_type(self) -> bool {
        matches!(
            self,
            BoolKw
                | ByteKw
                | CharKw
                | DecimalKw
                | DoubleKw
                | FloatKw
                | IntKw
                | LongKw
                | ObjectKw
                | SbyteKw
                | ShortKw
                | StringKw
                | UintKw
                | UlongKw
                | UshortKw
                | VoidKw
        )
    }

    /// Modifier keywords that may prefix a type or member declaration.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            AbstractKw
                | ConstKw
                | ExternKw
                | InternalKw
                | NewKw
                | OverrideKw
                | PrivateKw
                | ProtectedKw
                | PublicKw
                | ReadonlyKw
                | SealedKw
                | StaticKw
                | UnsafeKw
                | VirtualKw
                | VolatileKw
        )
    }

    /// The reserved keyword kind for `text`, if it is one.
    pub fn from_keyword(text: &str) -> Option<CsSyntaxKind> {
        let kind = match text {
            "abstract" => AbstractKw,
            "as" => AsKw,
            "base" => BaseKw,
            "bool" => BoolKw,
            "break" => BreakKw,
            "byte" => ByteKw,
            "case" => CaseKw,
            "catch" => CatchKw,
            "char" => CharKw,
            "checked" => CheckedKw,
            "class" => ClassKw,
            "const" => ConstKw,
            "continue" => ContinueKw,
            "decimal" => DecimalKw,
            "default" => DefaultKw,
            "delegate" => DelegateKw,
            "do" => DoKw,
            "double" => DoubleKw,
            "else" => ElseKw,
            "enum" => EnumKw,
            "event" => EventKw,
            "explicit" => ExplicitKw,
            "extern" => ExternKw,
            "false" => FalseKw,
            "finally" => FinallyKw,
            "fixed" => FixedKw,
            "float" => FloatKw,
            "for" => ForKw,
            "foreach" => ForeachKw,
            "goto" => GotoKw,
            "if" => IfKw,
            "implicit" => ImplicitKw,
            "in" => InKw,
            "int" => IntKw,
            "interface" => InterfaceKw,
            "internal" => InternalKw,
            "is" => IsKw,
            "lock" => LockKw,
            "long" => LongKw,
            "namespace" => NamespaceKw,
            "new" => NewKw,
            "null" => NullKw,
            "object" => ObjectKw,
            "operator" => OperatorKw,
            "out" => OutKw,
            "override" => OverrideKw,
            "params" => ParamsKw,
            "private" => PrivateKw,
            "protected" => ProtectedKw,
            "public" => PublicKw,
            "readonly" => ReadonlyKw,
            "ref" => RefKw,
            "return" => ReturnKw,
            "sbyte" => SbyteKw,
            "sealed" => SealedKw,
            "short" => ShortKw,
            "sizeof" => SizeofKw,
            "stackalloc" => StackallocKw,
            "static" => StaticKw,
            "string" => StringKw,
            "struct" => StructKw,
            "switch" => SwitchKw,
            "this" => ThisKw,
            "throw" => ThrowKw,
            "true" => TrueKw,
            "try" => TryKw,
            "typeof" => TypeofKw,
            "uint" => UintKw,
            "ulong" => UlongKw,
            "unchecked" => UncheckedKw,
            "unsafe" => UnsafeKw,
            "ushort" => UshortKw,
            "using" => UsingKw,
            "virtual" => VirtualKw,
            "void" => VoidKw,
            "volatile" => VolatileKw,
            "while" => WhileKw,
            _ => return None,
        };
        Some(kind)
    }

    /// True when `text` can never be used as a bare identifier.
    ///
    /// Short-name generation consults this so a compressed identifier is
    /// never a reserved word. `var` is reserved here as well: it is only
    /// contextual in the language, but a local named `var` would change the
    /// meaning of every `var` declaration in scope.
    pub fn is_reserved_word(text: &str) -> bool {
        Self::from_keyword(text).is_some() || text == "var"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(CsSyntaxKind::from_keyword("class"), Some(ClassKw));
        assert_eq!(CsSyntaxKind::from_keyword("private"), Some(PrivateKw));
        assert_eq!(CsSyntaxKind::from_keyword("Class"), None);
        assert_eq!(CsSyntaxKind::from_keyword("value"), None);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(Whitespace.is_trivia());
        assert!(RegionStart.is_trivia());
        assert!(!Ident.is_trivia());
        assert!(ClassKw.is_keyword());
        assert!(!LBrace.is_keyword());
        assert!(IntKw.is_predefined_type());
        assert!(PrivateKw.is_modifier());
        assert!(CompilationUnit.is_node());
        assert!(!Semicolon.is_node());
    }

    #[test]
    fn test_reserved_words() {
        assert!(CsSyntaxKind::is_reserved_word("as"));
        assert!(CsSyntaxKind::is_reserved_word("do"));
        assert!(CsSyntaxKind::is_reserved_word("var"));
        assert!(!CsSyntaxKind::is_reserved_word("aa"));
        assert!(!CsSyntaxKind::is_reserved_word("value"));
    }
}
