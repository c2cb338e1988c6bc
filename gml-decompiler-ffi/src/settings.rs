use gml_decompiler::DecompileSettings;

static SINGLE_PART_DOUBLES: &[(f64, &str)] = &[(std::f64::consts::PI, "pi")];

static MULTI_PART_DOUBLES: &[(f64, &str)] = &[
    (std::f64::consts::TAU, "2 * pi"),
    (12.566370614359172, "4 * pi"),
    (31.41592653589793, "10 * pi"),
    (0.3333333333333333, "1/3"),
    (0.6666666666666666, "2/3"),
    (1.3333333333333333, "4/3"),
    (23.333333333333332, "70/3"),
    (73.33333333333333, "220/3"),
    (206.66666666666666, "620/3"),
    (51.42857142857143, "360/7"),
    (1.0909090909090908, "12/11"),
    (0.06666666666666667, "1/15"),
    (0.9523809523809523, "20/21"),
    (0.03333333333333333, "1/30"),
    (0.008333333333333333, "1/120"),
];

/// Output style of the decompiler.
///
/// The exported entry points always use [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub indent_string: String,
    pub use_semicolon: bool,
    pub use_css_colors: bool,
    pub print_warnings: bool,
    pub macro_declarations_at_top: bool,
    pub empty_line_after_block_locals: bool,
    pub empty_line_around_enums: bool,
    pub empty_line_around_branch_statements: bool,
    pub empty_line_before_switch_cases: bool,
    pub empty_line_after_switch_cases: bool,
    pub empty_line_around_function_declarations: bool,
    pub empty_line_around_static_initialization: bool,
    pub open_block_brace_on_same_line: bool,
    pub remove_single_line_block_braces: bool,
    pub cleanup_try: bool,
    pub cleanup_else_to_continue: bool,
    pub cleanup_default_argument_values: bool,
    pub cleanup_builtin_array_variables: bool,
    pub cleanup_local_var_declarations: bool,
    pub create_enum_declarations: bool,
    pub unknown_enum_name: String,
    pub unknown_enum_value_pattern: String,
    pub unknown_argument_name_pattern: String,
    pub allow_leftover_data_on_stack: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            indent_string: "    ".to_string(),
            use_semicolon: true,
            use_css_colors: false,
            print_warnings: true,
            macro_declarations_at_top: true,
            empty_line_after_block_locals: true,
            empty_line_around_enums: true,
            empty_line_around_branch_statements: true,
            empty_line_before_switch_cases: false,
            empty_line_after_switch_cases: false,
            empty_line_around_function_declarations: true,
            empty_line_around_static_initialization: true,
            open_block_brace_on_same_line: true,
            remove_single_line_block_braces: false,
            cleanup_try: false,
            cleanup_else_to_continue: true,
            cleanup_default_argument_values: true,
            cleanup_builtin_array_variables: true,
            cleanup_local_var_declarations: true,
            create_enum_declarations: true,
            unknown_enum_name: "UnknownEnum".to_string(),
            unknown_enum_value_pattern: "Variant{0}".to_string(),
            unknown_argument_name_pattern: "arg{0}".to_string(),
            allow_leftover_data_on_stack: true,
        }
    }
}

fn lookup(table: &[(f64, &'static str)], value: f64) -> Option<&'static str> {
    table
        .iter()
        .find(|(known, _)| *known == value)
        .map(|(_, text)| *text)
}

impl DecompileSettings for Settings {
    fn indent_string(&self) -> &str {
        &self.indent_string
    }
    fn use_semicolon(&self) -> bool {
        self.use_semicolon
    }
    fn use_css_colors(&self) -> bool {
        self.use_css_colors
    }
    fn print_warnings(&self) -> bool {
        self.print_warnings
    }
    fn macro_declarations_at_top(&self) -> bool {
        self.macro_declarations_at_top
    }
    fn empty_line_after_block_locals(&self) -> bool {
        self.empty_line_after_block_locals
    }
    fn empty_line_around_enums(&self) -> bool {
        self.empty_line_around_enums
    }
    fn empty_line_around_branch_statements(&self) -> bool {
        self.empty_line_around_branch_statements
    }
    fn empty_line_before_switch_cases(&self) -> bool {
        self.empty_line_before_switch_cases
    }
    fn empty_line_after_switch_cases(&self) -> bool {
        self.empty_line_after_switch_cases
    }
    fn empty_line_around_function_declarations(&self) -> bool {
        self.empty_line_around_function_declarations
    }
    fn empty_line_around_static_initialization(&self) -> bool {
        self.empty_line_around_static_initialization
    }
    fn open_block_brace_on_same_line(&self) -> bool {
        self.open_block_brace_on_same_line
    }
    fn remove_single_line_block_braces(&self) -> bool {
        self.remove_single_line_block_braces
    }
    fn cleanup_try(&self) -> bool {
        self.cleanup_try
    }
    fn cleanup_else_to_continue(&self) -> bool {
        self.cleanup_else_to_continue
    }
    fn cleanup_default_argument_values(&self) -> bool {
        self.cleanup_default_argument_values
    }
    fn cleanup_builtin_array_variables(&self) -> bool {
        self.cleanup_builtin_array_variables
    }
    fn cleanup_local_var_declarations(&self) -> bool {
        self.cleanup_local_var_declarations
    }
    fn create_enum_declarations(&self) -> bool {
        self.create_enum_declarations
    }
    fn unknown_enum_name(&self) -> &str {
        &self.unknown_enum_name
    }
    fn unknown_enum_value_pattern(&self) -> &str {
        &self.unknown_enum_value_pattern
    }
    fn unknown_argument_name_pattern(&self) -> &str {
        &self.unknown_argument_name_pattern
    }
    fn allow_leftover_data_on_stack(&self) -> bool {
        self.allow_leftover_data_on_stack
    }

    /// Exact bit-for-bit match only; no tolerance.
    fn try_get_predefined_double(&self, value: f64) -> Option<(&'static str, bool)> {
        if let Some(text) = lookup(SINGLE_PART_DOUBLES, value) {
            return Some((text, false));
        }
        lookup(MULTI_PART_DOUBLES, value).map(|text| (text, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::approx_constant)]
    fn predefined_doubles() {
        let settings = Settings::default();
        assert_eq!(
            settings.try_get_predefined_double(std::f64::consts::PI),
            Some(("pi", false))
        );
        assert_eq!(
            settings.try_get_predefined_double(0.3333333333333333),
            Some(("1/3", true))
        );
        assert_eq!(
            settings.try_get_predefined_double(std::f64::consts::TAU),
            Some(("2 * pi", true))
        );
        assert_eq!(
            settings.try_get_predefined_double(0.008333333333333333),
            Some(("1/120", true))
        );
        assert_eq!(settings.try_get_predefined_double(3.14), None);
        assert_eq!(settings.try_get_predefined_double(0.0), None);
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.indent_string(), "    ");
        assert!(settings.use_semicolon());
        assert!(!settings.use_css_colors());
        assert!(settings.open_block_brace_on_same_line());
        assert!(!settings.empty_line_before_switch_cases());
        assert!(!settings.cleanup_try());
        assert!(settings.allow_leftover_data_on_stack());
        assert_eq!(settings.unknown_enum_value_pattern(), "Variant{0}");
        assert_eq!(settings.unknown_argument_name_pattern(), "arg{0}");
    }
}
