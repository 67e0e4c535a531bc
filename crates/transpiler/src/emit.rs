//! # Swift Emitter
//!
//! Renders a transpiled file's intentions as Swift source. Four-space
//! indentation, one blank line between top-level items, preprocessor
//! directives echoed as a leading comment block.

use crate::intentions::*;
use objswift_ast::{
    CompoundStatement, ExprKind, Expression, FunctionArgument, Pattern, PostfixOperation,
    SizeOfTarget, Statement, StmtKind,
};

/// Render one file's worth of intentions.
pub fn emit_file(file: &FileIntention) -> String {
    let mut emitter = SwiftEmitter::new();
    emitter.emit_file(file);
    emitter.finish()
}

struct SwiftEmitter {
    out: String,
    indent: usize,
    /// Top-level separator state.
    wrote_item: bool,
}

impl SwiftEmitter {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            wrote_item: false,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn separate_item(&mut self) {
        if self.wrote_item {
            self.line("");
        }
        self.wrote_item = true;
    }

    fn emit_file(&mut self, file: &FileIntention) {
        if !file.preprocessor_directives.is_empty() {
            self.line("// Preprocessor directives found in file:");
            for directive in &file.preprocessor_directives {
                self.line(format!("// {}", directive));
            }
            self.wrote_item = true;
        }

        for typedef in &file.typedefs {
            self.separate_item();
            self.emit_typedef(typedef);
        }
        for enumeration in &file.enums {
            self.separate_item();
            self.emit_enum(enumeration);
        }
        for structure in &file.structs {
            self.separate_item();
            self.emit_struct(structure);
        }
        for global in &file.global_variables {
            self.separate_item();
            self.emit_global_var(global);
        }
        for function in &file.global_functions {
            self.separate_item();
            self.emit_global_func(function);
        }
        for protocol in &file.protocols {
            self.separate_item();
            self.emit_protocol(protocol);
        }
        for class in &file.classes {
            self.separate_item();
            self.emit_class(class);
        }
        for extension in &file.extensions {
            self.separate_item();
            self.emit_extension(extension);
        }
    }

    fn access_prefix(access: AccessLevel) -> String {
        match access.keyword() {
            Some(keyword) => format!("{} ", keyword),
            None => String::new(),
        }
    }

    fn emit_typedef(&mut self, typedef: &TypedefIntention) {
        self.line(format!(
            "{}typealias {} = {}",
            Self::access_prefix(typedef.access),
            typedef.name,
            typedef.aliased
        ));
    }

    fn emit_enum(&mut self, enumeration: &EnumIntention) {
        let access = Self::access_prefix(enumeration.access);
        if enumeration.is_option_set {
            self.line(format!(
                "{}struct {}: OptionSet {{",
                access, enumeration.name
            ));
            self.indent += 1;
            self.line(format!("let rawValue: {}", enumeration.raw_type));
            self.line("");
            for (index, case) in enumeration.cases.iter().enumerate() {
                match &case.value {
                    Some(value) => self.line(format!(
                        "static let {} = {}(rawValue: {})",
                        case.name,
                        enumeration.name,
                        emit_expression(value)
                    )),
                    // C enumerators without a value count up from zero.
                    None => self.line(format!(
                        "static let {} = {}(rawValue: {})",
                        case.name, enumeration.name, index
                    )),
                }
            }
            self.indent -= 1;
            self.line("}");
        } else {
            self.line(format!(
                "{}enum {}: {} {{",
                access, enumeration.name, enumeration.raw_type
            ));
            self.indent += 1;
            for case in &enumeration.cases {
                match &case.value {
                    Some(value) => {
                        self.line(format!("case {} = {}", case.name, emit_expression(value)))
                    }
                    None => self.line(format!("case {}", case.name)),
                }
            }
            self.indent -= 1;
            self.line("}");
        }
    }

    fn emit_struct(&mut self, structure: &StructIntention) {
        self.line(format!(
            "{}struct {} {{",
            Self::access_prefix(structure.access),
            structure.name
        ));
        self.indent += 1;
        for field in &structure.fields {
            self.line(format!("var {}: {}", field.name, field.ty));
        }
        self.indent -= 1;
        self.line("}");
    }

    fn emit_global_var(&mut self, global: &GlobalVarIntention) {
        let keyword = if global.is_constant { "let" } else { "var" };
        let mut line = format!(
            "{}{} {}: {}",
            Self::access_prefix(global.access),
            keyword,
            global.name,
            global.ty
        );
        if let Some(init) = &global.initializer {
            line.push_str(" = ");
            line.push_str(&emit_expression(init));
        }
        self.line(line);
    }

    fn emit_global_func(&mut self, function: &GlobalFuncIntention) {
        let header = format!(
            "{}{}",
            Self::access_prefix(function.access),
            function.signature
        );
        match &function.body {
            Some(body) => {
                self.line(format!("{} {{", header));
                self.emit_body(body);
                self.line("}");
            }
            None => self.line(header),
        }
    }

    fn emit_protocol(&mut self, protocol: &ProtocolIntention) {
        let has_optionals = protocol.methods.iter().any(|m| m.is_optional)
            || protocol.properties.iter().any(|p| p.is_optional);
        let objc_prefix = if has_optionals { "@objc " } else { "" };

        let mut header = format!(
            "{}{}protocol {}",
            objc_prefix,
            Self::access_prefix(protocol.access),
            protocol.name
        );
        if !protocol.protocols.is_empty() {
            header.push_str(": ");
            header.push_str(
                &protocol
                    .protocols
                    .iter()
                    .map(|p| p.resolve())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        header.push_str(" {");
        self.line(header);
        self.indent += 1;

        for property in &protocol.properties {
            let accessors = if property.is_readonly {
                "{ get }"
            } else {
                "{ get set }"
            };
            let optional_prefix = if property.is_optional {
                "@objc optional "
            } else {
                ""
            };
            self.line(format!(
                "{}var {}: {} {}",
                optional_prefix, property.name, property.ty, accessors
            ));
        }
        for method in &protocol.methods {
            let optional_prefix = if method.is_optional {
                "@objc optional "
            } else {
                ""
            };
            self.line(format!("{}{}", optional_prefix, method.signature));
        }

        self.indent -= 1;
        self.line("}");
    }

    fn emit_class(&mut self, class: &ClassIntention) {
        let mut header = format!("{}class {}", Self::access_prefix(class.access), class.name);
        let mut supers: Vec<String> = Vec::new();
        if let Some(superclass) = class.superclass {
            supers.push(superclass.resolve());
        }
        supers.extend(class.protocols.iter().map(|p| p.resolve()));
        if !supers.is_empty() {
            header.push_str(": ");
            header.push_str(&supers.join(", "));
        }
        header.push_str(" {");
        self.line(header);
        self.indent += 1;

        let mut wrote_member = false;
        for ivar in &class.ivars {
            wrote_member = true;
            let ownership = match ivar.ownership.keyword() {
                Some(keyword) => format!("{} ", keyword),
                None => String::new(),
            };
            self.line(format!(
                "{}{}var {}: {}",
                Self::access_prefix(ivar.access),
                ownership,
                ivar.name,
                ivar.ty
            ));
        }
        for property in &class.properties {
            wrote_member = true;
            self.emit_property(property);
        }

        for init in &class.inits {
            if wrote_member {
                self.line("");
            }
            wrote_member = true;
            self.emit_init(init);
        }
        if let Some(deinit) = &class.deinit {
            if wrote_member {
                self.line("");
            }
            wrote_member = true;
            self.line("deinit {");
            if let Some(body) = &deinit.body {
                self.emit_body(body);
            }
            self.line("}");
        }
        for method in &class.methods {
            if wrote_member {
                self.line("");
            }
            wrote_member = true;
            self.emit_method(method);
        }

        self.indent -= 1;
        self.line("}");
    }

    fn emit_property(&mut self, property: &PropertyIntention) {
        let mut line = Self::access_prefix(property.access);
        if property.is_static {
            line.push_str("static ");
        }
        if let Some(keyword) = property.ownership.keyword() {
            line.push_str(keyword);
            line.push(' ');
        }
        if property.is_readonly {
            line.push_str("private(set) ");
        }
        line.push_str(&format!("var {}: {}", property.name, property.ty));
        self.line(line);
    }

    fn emit_init(&mut self, init: &InitIntention) {
        let mut header = Self::access_prefix(init.access);
        header.push_str("init");
        if init.is_failable {
            header.push('?');
        }
        header.push('(');
        for (index, parameter) in init.parameters.iter().enumerate() {
            if index > 0 {
                header.push_str(", ");
            }
            match parameter.label {
                Some(label) if label == parameter.name => {
                    header.push_str(&format!("{}: {}", parameter.name, parameter.ty))
                }
                Some(label) => {
                    header.push_str(&format!("{} {}: {}", label, parameter.name, parameter.ty))
                }
                None => header.push_str(&format!("_ {}: {}", parameter.name, parameter.ty)),
            }
        }
        header.push(')');

        match &init.body {
            Some(body) => {
                self.line(format!("{} {{", header));
                self.emit_body(body);
                self.line("}");
            }
            None => self.line(header),
        }
    }

    fn emit_method(&mut self, method: &MethodIntention) {
        let mut header = Self::access_prefix(method.access);
        if method.is_override {
            header.push_str("override ");
        }
        header.push_str(&method.signature.to_string());

        match &method.body {
            Some(body) => {
                self.line(format!("{} {{", header));
                self.emit_body(body);
                self.line("}");
            }
            None => self.line(header),
        }
    }

    fn emit_extension(&mut self, extension: &ExtensionIntention) {
        if let Some(category) = extension.category_name {
            self.line(format!("// MARK: - {}", category));
        }
        let mut header = format!(
            "{}extension {}",
            Self::access_prefix(extension.access),
            extension.class_name
        );
        if !extension.protocols.is_empty() {
            header.push_str(": ");
            header.push_str(
                &extension
                    .protocols
                    .iter()
                    .map(|p| p.resolve())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        header.push_str(" {");
        self.line(header);
        self.indent += 1;
        let mut wrote_member = false;
        for property in &extension.properties {
            wrote_member = true;
            self.emit_property(property);
        }
        for method in &extension.methods {
            if wrote_member {
                self.line("");
            }
            wrote_member = true;
            self.emit_method(method);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn emit_body(&mut self, body: &CompoundStatement) {
        self.indent += 1;
        for statement in body.iter() {
            self.emit_statement(statement);
        }
        self.indent -= 1;
    }

    fn emit_statement(&mut self, statement: &Statement) {
        for comment in &statement.leading_comments {
            self.line(format!("// {}", comment));
        }
        let label_prefix = match statement.label {
            Some(label) => format!("{}: ", label),
            None => String::new(),
        };

        match &statement.kind {
            StmtKind::Compound(body) => {
                self.line(format!("{}do {{", label_prefix));
                self.emit_body(body);
                self.line("}");
            }
            StmtKind::If {
                pattern,
                condition,
                body,
                else_body,
            } => self.emit_if(&label_prefix, pattern, condition, body, else_body.as_ref()),
            StmtKind::While { condition, body } => {
                self.line(format!(
                    "{}while {} {{",
                    label_prefix,
                    emit_expression(condition)
                ));
                self.emit_body(body);
                self.line("}");
            }
            StmtKind::RepeatWhile { condition, body } => {
                self.line(format!("{}repeat {{", label_prefix));
                self.emit_body(body);
                self.line(format!("}} while {}", emit_expression(condition)));
            }
            StmtKind::For { pattern, exp, body } => {
                self.line(format!(
                    "{}for {} in {} {{",
                    label_prefix,
                    emit_pattern(pattern),
                    emit_expression(exp)
                ));
                self.emit_body(body);
                self.line("}");
            }
            StmtKind::Switch {
                exp,
                cases,
                default,
            } => {
                self.line(format!("{}switch {} {{", label_prefix, emit_expression(exp)));
                for case in cases {
                    let patterns = case
                        .patterns
                        .iter()
                        .map(emit_pattern)
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.line(format!("case {}:", patterns));
                    self.indent += 1;
                    for stmt in &case.statements {
                        self.emit_statement(stmt);
                    }
                    self.indent -= 1;
                }
                if let Some(default) = default {
                    self.line("default:");
                    self.indent += 1;
                    for stmt in default {
                        self.emit_statement(stmt);
                    }
                    self.indent -= 1;
                }
                self.line("}");
            }
            StmtKind::Do(body) => {
                self.line(format!("{}do {{", label_prefix));
                self.emit_body(body);
                self.line("}");
            }
            StmtKind::Defer(body) => {
                self.line("defer {");
                self.emit_body(body);
                self.line("}");
            }
            StmtKind::Return(None) => self.line("return"),
            StmtKind::Return(Some(exp)) => {
                self.line(format!("return {}", emit_expression(exp)))
            }
            StmtKind::Break(None) => self.line("break"),
            StmtKind::Break(Some(label)) => self.line(format!("break {}", label)),
            StmtKind::Continue(None) => self.line("continue"),
            StmtKind::Continue(Some(label)) => self.line(format!("continue {}", label)),
            StmtKind::Expressions(exps) => {
                for exp in exps {
                    self.line(emit_expression(exp));
                }
            }
            StmtKind::VariableDeclarations(declarations) => {
                for declaration in declarations {
                    let keyword = if declaration.is_constant { "let" } else { "var" };
                    let mut line =
                        format!("{} {}: {}", keyword, declaration.name, declaration.ty);
                    if let Some(init) = &declaration.initialization {
                        line.push_str(" = ");
                        line.push_str(&emit_expression(init));
                    }
                    self.line(line);
                }
            }
            StmtKind::Unknown(context) => {
                self.line(format!("// {}", context.context));
            }
        }
    }

    fn emit_if(
        &mut self,
        label_prefix: &str,
        pattern: &Option<Pattern>,
        condition: &Expression,
        body: &CompoundStatement,
        else_body: Option<&CompoundStatement>,
    ) {
        let condition_text = match pattern {
            Some(pattern) => format!(
                "let {} = {}",
                emit_pattern(pattern),
                emit_expression(condition)
            ),
            None => emit_expression(condition),
        };
        self.line(format!("{}if {} {{", label_prefix, condition_text));
        self.emit_body(body);

        match else_body {
            None => self.line("}"),
            Some(else_body) => {
                // `else if` chains flatten when the else body is one `if`.
                if else_body.len() == 1 {
                    if let StmtKind::If {
                        pattern,
                        condition,
                        body,
                        else_body: nested_else,
                    } = &else_body.statements[0].kind
                    {
                        let nested_condition = match pattern {
                            Some(pattern) => format!(
                                "let {} = {}",
                                emit_pattern(pattern),
                                emit_expression(condition)
                            ),
                            None => emit_expression(condition),
                        };
                        self.line(format!("}} else if {} {{", nested_condition));
                        self.emit_body(body);
                        match nested_else {
                            None => self.line("}"),
                            Some(nested) => {
                                self.line("} else {");
                                self.emit_body(nested);
                                self.line("}");
                            }
                        }
                        return;
                    }
                }
                self.line("} else {");
                self.emit_body(else_body);
                self.line("}");
            }
        }
    }
}

fn emit_pattern(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Identifier(name) => name.resolve(),
        Pattern::Wildcard => "_".to_string(),
        Pattern::Tuple(items) => format!(
            "({})",
            items.iter().map(emit_pattern).collect::<Vec<_>>().join(", ")
        ),
        Pattern::Expression(exp) => emit_expression(exp),
    }
}

/// Render one expression.
pub fn emit_expression(exp: &Expression) -> String {
    match &exp.kind {
        ExprKind::Identifier(name) => name.resolve(),
        ExprKind::Constant(constant) => constant.to_string(),
        ExprKind::ArrayLiteral(items) => format!(
            "[{}]",
            items
                .iter()
                .map(emit_expression)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        ExprKind::DictionaryLiteral(pairs) if pairs.is_empty() => "[:]".to_string(),
        ExprKind::DictionaryLiteral(pairs) => format!(
            "[{}]",
            pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", emit_expression(k), emit_expression(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        ExprKind::Binary { lhs, op, rhs } => format!(
            "{} {} {}",
            emit_operand(lhs),
            op.lexeme(),
            emit_operand(rhs)
        ),
        ExprKind::Unary { op, exp } => format!("{}{}", op.lexeme(), emit_operand(exp)),
        ExprKind::Ternary {
            condition,
            if_true,
            if_false,
        } => format!(
            "{} ? {} : {}",
            emit_operand(condition),
            emit_expression(if_true),
            emit_expression(if_false)
        ),
        ExprKind::Cast {
            exp: inner,
            target,
            optional,
        } => format!(
            "{} as{} {}",
            emit_operand(inner),
            if *optional { "?" } else { "" },
            target
        ),
        ExprKind::TypeCheck { exp: inner, target } => {
            format!("{} is {}", emit_operand(inner), target)
        }
        ExprKind::Assignment { lhs, op, rhs } => format!(
            "{} {} {}",
            emit_expression(lhs),
            op.lexeme(),
            emit_expression(rhs)
        ),
        ExprKind::Parens(inner) => format!("({})", emit_expression(inner)),
        ExprKind::Closure {
            parameters,
            return_type,
            body,
        } => {
            let mut out = String::from("{ ");
            if !parameters.is_empty() || !return_type.is_void() {
                out.push('(');
                for (index, parameter) in parameters.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&format!("{}: {}", parameter.name, parameter.ty));
                }
                out.push_str(&format!(") -> {} in ", return_type));
            }
            for statement in body.iter() {
                let mut nested = SwiftEmitter::new();
                nested.emit_statement(statement);
                out.push_str(nested.finish().trim_end());
                out.push_str("; ");
            }
            out.push('}');
            out
        }
        ExprKind::SizeOf(SizeOfTarget::Type(ty)) => format!("MemoryLayout<{}>.size", ty),
        ExprKind::SizeOf(SizeOfTarget::Expression(inner)) => {
            format!("MemoryLayout.size(ofValue: {})", emit_expression(inner))
        }
        ExprKind::Postfix { base, operation } => {
            let base_text = emit_operand(base);
            match operation {
                PostfixOperation::Member {
                    name,
                    optional_access,
                } => format!(
                    "{}{}.{}",
                    base_text,
                    if *optional_access { "?" } else { "" },
                    name
                ),
                PostfixOperation::Subscript {
                    index,
                    optional_access,
                } => format!(
                    "{}{}[{}]",
                    base_text,
                    if *optional_access { "?" } else { "" },
                    emit_expression(index)
                ),
                PostfixOperation::Call {
                    arguments,
                    optional_access,
                } => format!(
                    "{}{}({})",
                    base_text,
                    if *optional_access { "?" } else { "" },
                    emit_arguments(arguments)
                ),
            }
        }
    }
}

fn emit_arguments(arguments: &[FunctionArgument]) -> String {
    arguments
        .iter()
        .map(|argument| match argument.label {
            Some(label) => format!("{}: {}", label, emit_expression(&argument.expression)),
            None => emit_expression(&argument.expression),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Operand positions need parentheses around loosely-binding forms.
fn emit_operand(exp: &Expression) -> String {
    let needs_parens = matches!(
        &exp.kind,
        ExprKind::Binary { .. }
            | ExprKind::Ternary { .. }
            | ExprKind::Cast { .. }
            | ExprKind::TypeCheck { .. }
            | ExprKind::Assignment { .. }
    );
    if needs_parens {
        format!("({})", emit_expression(exp))
    } else {
        emit_expression(exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objswift_ast::{Name, Operator, SourceRef, SwiftType};

    #[test]
    fn expressions_render() {
        let exp = Expression::identifier("path").dot("move").call(vec![
            FunctionArgument::labeled(
                "to",
                Expression::identifier("CGPoint").call(vec![
                    FunctionArgument::labeled("x", Expression::integer(1)),
                    FunctionArgument::labeled("y", Expression::integer(2)),
                ]),
            ),
        ]);
        assert_eq!(emit_expression(&exp), "path.move(to: CGPoint(x: 1, y: 2))");
    }

    #[test]
    fn optional_chaining_renders() {
        let exp = Expression::identifier("value")
            .optional_cast_to(SwiftType::type_name("Sub"))
            .optional_dot("run")
            .call(vec![]);
        assert_eq!(emit_expression(&exp), "(value as? Sub)?.run()");
    }

    #[test]
    fn binary_operands_parenthesize() {
        let exp = Expression::identifier("a")
            .binary(Operator::Add, Expression::identifier("b"))
            .binary(Operator::Multiply, Expression::identifier("c"));
        assert_eq!(emit_expression(&exp), "(a + b) * c");
    }

    #[test]
    fn property_lines_render_ownership() {
        let mut file = FileIntention::new("P.m");
        let mut class = ClassIntention::new(Name::new("Holder"), SourceRef::synthesized());
        class.properties.push(PropertyIntention {
            name: "delegate".into(),
            ty: SwiftType::optional_of(SwiftType::type_name("Delegate")),
            ownership: Ownership::Weak,
            is_readonly: false,
            is_static: false,
            is_optional: false,
            getter_name: None,
            setter_name: None,
            access: AccessLevel::Internal,
            source: SourceRef::synthesized(),
            in_nonnull_context: false,
            parent: Some("Holder".into()),
        });
        file.classes.push(class);

        let swift = emit_file(&file);
        assert!(swift.contains("class Holder {"));
        assert!(swift.contains("weak var delegate: Delegate?"));
    }

    #[test]
    fn preprocessor_block_leads_the_file() {
        let mut file = FileIntention::new("P.m");
        file.preprocessor_directives = vec!["#import <UIKit/UIKit.h>".into()];
        let swift = emit_file(&file);
        assert!(swift.starts_with(
            "// Preprocessor directives found in file:\n// #import <UIKit/UIKit.h>\n"
        ));
    }

    #[test]
    fn switch_renders_cases_and_default() {
        let stmt = Statement::new(StmtKind::Switch {
            exp: Expression::identifier("x"),
            cases: vec![objswift_ast::SwitchCase {
                patterns: vec![Pattern::Expression(Box::new(Expression::integer(1)))],
                statements: vec![Statement::expression(
                    Expression::identifier("handle").call(vec![]),
                )],
            }],
            default: Some(vec![Statement::break_stmt()]),
        });
        let mut emitter = SwiftEmitter::new();
        emitter.emit_statement(&stmt);
        let text = emitter.finish();
        assert_eq!(
            text,
            "switch x {\ncase 1:\n    handle()\ndefault:\n    break\n}\n"
        );
    }
}
