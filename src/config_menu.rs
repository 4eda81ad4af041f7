use crate::api::department_name;
use crate::configuration::{Configuration, OBJECTIVES};
use crate::theme::Theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, StatefulWidget, Widget},
};

const PANEL_WIDTH: u16 = 64;
const LABEL_WIDTH: usize = 13;

/// Departments shown at once in the panel's scrolling list
const DEPARTMENT_ROWS: usize = 5;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Field {
    #[default]
    Semester,
    Curriculum,
    Prefix,
    Excluded,
    Constraints,
    Objective,
    Departments,
    Apply,
}

impl Field {
    const ORDER: [Field; 8] = [
        Field::Semester,
        Field::Curriculum,
        Field::Prefix,
        Field::Excluded,
        Field::Constraints,
        Field::Objective,
        Field::Departments,
        Field::Apply,
    ];

    fn position(self) -> usize {
        Field::ORDER.iter().position(|&f| f == self).unwrap_or(0)
    }

    fn next(self) -> Field {
        Field::ORDER[(self.position() + 1) % Field::ORDER.len()]
    }

    fn prev(self) -> Field {
        let len = Field::ORDER.len();
        Field::ORDER[(self.position() + len - 1) % len]
    }
}

/// An extra "at least N courses" bound on one selected prefix
#[derive(Clone, Debug, Eq, PartialEq)]
struct ConstraintRow {
    prefix: String,
    enabled: bool,
    amount: String,
}

/// The course configuration panel
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ConfigMenu<'a> {
    pub(crate) config: &'a Configuration,
    pub(crate) departments: &'a [String],
    pub(crate) theme: &'a Theme,
}

impl ConfigMenu<'_> {
    fn label(&self, state: &ConfigMenuState, field: Field, text: &'static str) -> Span<'static> {
        let style = if state.field == field {
            self.theme.focused
        } else {
            self.theme.muted
        };
        Span::styled(format!("{text:<LABEL_WIDTH$}"), style)
    }

    fn input(&self, value: &str) -> Span<'static> {
        Span::styled(format!("{value:<16}"), self.theme.input)
    }

    fn lines(&self, state: &ConfigMenuState) -> Vec<Line<'static>> {
        let theme = self.theme;
        // Nothing chosen yet shows as a dash, matching the empty value sent
        let semester = state
            .semester
            .and_then(|i| state.semesters.get(i))
            .map_or("—", String::as_str);
        let mut lines = vec![
            Line::from(vec![
                self.label(state, Field::Semester, "Semester"),
                Span::styled(format!("‹ {semester} ›"), theme.base),
            ]),
            Line::from(vec![
                self.label(state, Field::Curriculum, "Curriculum"),
                self.input(&state.curriculum),
            ]),
            Line::from(vec![
                Span::styled(format!("{:<LABEL_WIDTH$}", "Prefixes"), theme.muted),
                Span::styled(self.config.selected_prefixes().join(", "), theme.bold),
            ]),
            Line::from(vec![
                self.label(state, Field::Prefix, "  add"),
                self.input(&state.prefix),
            ]),
            Line::from(vec![
                Span::styled(format!("{:<LABEL_WIDTH$}", "Excluded"), theme.muted),
                Span::styled(self.config.excluded_courses().join(", "), theme.bold),
            ]),
            Line::from(vec![
                self.label(state, Field::Excluded, "  add"),
                self.input(&state.excluded),
            ]),
            Line::from(self.label(state, Field::Constraints, "Constraints")),
        ];
        if state.constraints.is_empty() {
            lines.push(Line::styled("  Add a prefix to constrain it", theme.muted));
        }
        for (i, row) in state.constraints.iter().enumerate() {
            let style = if row.enabled { theme.base } else { theme.muted };
            let mut check = Span::styled(
                if row.enabled { "  [x] " } else { "  [ ] " },
                style,
            );
            if state.field == Field::Constraints && i == state.constraint_cursor {
                check = check.patch_style(theme.selected);
            }
            lines.push(Line::from(vec![
                check,
                Span::styled("at least ", style),
                Span::styled(format!("{:<4}", row.amount), theme.input),
                Span::styled(format!(" courses with prefix '{}'", row.prefix), style),
            ]));
        }
        let objective = OBJECTIVES.get(state.objective).copied().unwrap_or_default();
        lines.push(Line::from(vec![
            self.label(state, Field::Objective, "Objective"),
            Span::styled(format!("‹ {objective} ›"), theme.base),
        ]));
        lines.push(Line::from(self.label(state, Field::Departments, "Departments")));
        if self.departments.is_empty() {
            lines.push(Line::styled("  (none loaded)", theme.muted));
        }
        let start = state
            .department_cursor
            .saturating_sub(DEPARTMENT_ROWS / 2)
            .min(self.departments.len().saturating_sub(DEPARTMENT_ROWS));
        for (i, raw) in self
            .departments
            .iter()
            .enumerate()
            .skip(start)
            .take(DEPARTMENT_ROWS)
        {
            let style = if state.field == Field::Departments && i == state.department_cursor {
                theme.selected
            } else {
                theme.base
            };
            lines.push(Line::styled(format!("  {}", department_name(raw)), style));
        }
        lines.push(Line::default());
        let apply_style = if state.field == Field::Apply {
            theme.selected
        } else {
            theme.bold
        };
        lines.push(Line::from(Span::styled("[ Apply ]", apply_style)).centered());
        lines
    }
}

impl StatefulWidget for ConfigMenu<'_> {
    type State = ConfigMenuState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ConfigMenuState) {
        let lines = self.lines(state);
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
        let [panel] = Layout::horizontal([Constraint::Length(PANEL_WIDTH)])
            .flex(Flex::Center)
            .areas(area);
        let [panel] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(panel);
        Clear.render(panel, buf);
        Paragraph::new(lines)
            .block(Block::bordered().title(" Configure courses "))
            .style(self.theme.base)
            .render(panel, buf);
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ConfigMenuState {
    field: Field,
    semesters: Vec<String>,
    /// `None` until the configuration holds one of the offered semesters
    semester: Option<usize>,
    curriculum: String,
    prefix: String,
    excluded: String,
    constraints: Vec<ConstraintRow>,
    constraint_cursor: usize,
    objective: usize,
    department_cursor: usize,
}

impl ConfigMenuState {
    /// Open the panel on the current contents of `config`
    pub(crate) fn new(config: &Configuration, semesters: &[String]) -> ConfigMenuState {
        let mut constraints: Vec<ConstraintRow> = Vec::new();
        for prefix in config.selected_prefixes() {
            if constraints.iter().all(|row| &row.prefix != prefix) {
                let amount = config.additional_constraints().get(prefix);
                constraints.push(ConstraintRow {
                    prefix: prefix.clone(),
                    enabled: amount.is_some(),
                    amount: amount.map(ToString::to_string).unwrap_or_default(),
                });
            }
        }
        ConfigMenuState {
            semesters: semesters.to_vec(),
            semester: semesters.iter().position(|s| s == config.semester()),
            curriculum: config.curriculum().to_owned(),
            constraints,
            objective: OBJECTIVES
                .iter()
                .position(|&o| o == config.objective())
                .unwrap_or(0),
            ..ConfigMenuState::default()
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        key: KeyCode,
        config: &mut Configuration,
        departments: &[String],
    ) -> ConfigOutput {
        match (self.field, key) {
            (_, KeyCode::Esc) => ConfigOutput::Close,
            (_, KeyCode::Tab) => {
                self.field = self.field.next();
                ConfigOutput::Ok
            }
            (_, KeyCode::BackTab) => {
                self.field = self.field.prev();
                ConfigOutput::Ok
            }
            (Field::Semester, KeyCode::Left | KeyCode::Right) => {
                let len = self.semesters.len();
                if len == 0 {
                    return ConfigOutput::Invalid;
                }
                let next = match (self.semester, key) {
                    (None, KeyCode::Left) => len - 1,
                    (None, _) => 0,
                    (Some(i), KeyCode::Left) => (i + len - 1) % len,
                    (Some(i), _) => (i + 1) % len,
                };
                self.semester = Some(next);
                if let Some(semester) = self.semesters.get(next) {
                    config.set_semester(semester.as_str());
                }
                ConfigOutput::Ok
            }
            (Field::Objective, KeyCode::Left | KeyCode::Right) => {
                let len = OBJECTIVES.len();
                self.objective = if key == KeyCode::Left {
                    (self.objective + len - 1) % len
                } else {
                    (self.objective + 1) % len
                };
                if let Some(&objective) = OBJECTIVES.get(self.objective) {
                    config.set_objective(objective);
                }
                ConfigOutput::Ok
            }
            (Field::Curriculum | Field::Prefix | Field::Excluded, KeyCode::Char(c))
                if !c.is_control() =>
            {
                self.text_mut().push(c);
                ConfigOutput::Ok
            }
            (Field::Curriculum | Field::Prefix | Field::Excluded, KeyCode::Backspace) => {
                if self.text_mut().pop().is_some() {
                    ConfigOutput::Ok
                } else {
                    ConfigOutput::Invalid
                }
            }
            (Field::Curriculum, KeyCode::Enter) => {
                self.field = self.field.next();
                ConfigOutput::Ok
            }
            (Field::Prefix, KeyCode::Enter) => self.add_prefix(config),
            (Field::Excluded, KeyCode::Enter) => {
                let course = self.excluded.trim();
                if course.is_empty() {
                    return ConfigOutput::Invalid;
                }
                tracing::debug!(course, "Excluding course");
                config.exclude_course(course);
                self.excluded.clear();
                ConfigOutput::Ok
            }
            (Field::Constraints, KeyCode::Up) => {
                self.constraint_cursor = self.constraint_cursor.saturating_sub(1);
                ConfigOutput::Ok
            }
            (Field::Constraints, KeyCode::Down) => {
                if self.constraint_cursor + 1 < self.constraints.len() {
                    self.constraint_cursor += 1;
                }
                ConfigOutput::Ok
            }
            (Field::Constraints, KeyCode::Char(' ') | KeyCode::Enter) => {
                let Some(row) = self.constraints.get_mut(self.constraint_cursor) else {
                    return ConfigOutput::Invalid;
                };
                row.enabled = !row.enabled;
                row.amount = if row.enabled {
                    String::from("0")
                } else {
                    String::new()
                };
                ConfigOutput::Ok
            }
            (Field::Constraints, KeyCode::Char(c)) if c.is_ascii_digit() => {
                match self.constraints.get_mut(self.constraint_cursor) {
                    Some(row) if row.enabled => {
                        if row.amount == "0" {
                            row.amount.clear();
                        }
                        row.amount.push(c);
                        ConfigOutput::Ok
                    }
                    _ => ConfigOutput::Invalid,
                }
            }
            (Field::Constraints, KeyCode::Backspace) => {
                match self.constraints.get_mut(self.constraint_cursor) {
                    Some(row) if row.enabled => {
                        if row.amount.pop().is_some() {
                            ConfigOutput::Ok
                        } else {
                            ConfigOutput::Invalid
                        }
                    }
                    _ => ConfigOutput::Invalid,
                }
            }
            (Field::Departments, KeyCode::Up) => {
                self.department_cursor = self.department_cursor.saturating_sub(1);
                ConfigOutput::Ok
            }
            (Field::Departments, KeyCode::Down) => {
                if self.department_cursor + 1 < departments.len() {
                    self.department_cursor += 1;
                }
                ConfigOutput::Ok
            }
            (Field::Departments, KeyCode::Enter) => match departments.get(self.department_cursor)
            {
                Some(raw) => {
                    self.curriculum.clone_from(raw);
                    ConfigOutput::Ok
                }
                None => ConfigOutput::Invalid,
            },
            (Field::Apply, KeyCode::Enter) => {
                self.apply(config);
                ConfigOutput::Applied
            }
            _ => ConfigOutput::Invalid,
        }
    }

    fn text_mut(&mut self) -> &mut String {
        match self.field {
            Field::Prefix => &mut self.prefix,
            Field::Excluded => &mut self.excluded,
            _ => &mut self.curriculum,
        }
    }

    fn add_prefix(&mut self, config: &mut Configuration) -> ConfigOutput {
        let prefix = self.prefix.trim();
        if prefix.is_empty() {
            return ConfigOutput::Invalid;
        }
        tracing::debug!(prefix, "Adding prefix");
        config.add_prefix(prefix);
        if self.constraints.iter().all(|row| row.prefix != prefix) {
            self.constraints.push(ConstraintRow {
                prefix: prefix.to_owned(),
                enabled: false,
                amount: String::new(),
            });
        }
        self.prefix.clear();
        ConfigOutput::Ok
    }

    /// Commit the curriculum and every constraint row, dropping the ones
    /// that are switched off
    fn apply(&self, config: &mut Configuration) {
        config.set_curriculum(self.curriculum.trim());
        for row in &self.constraints {
            if !row.enabled {
                config.remove_additional_constraint(&row.prefix);
                continue;
            }
            match row.amount.parse::<i64>() {
                Ok(amount) => config.add_additional_constraint(row.prefix.as_str(), amount),
                Err(e) => {
                    tracing::warn!(
                        prefix = %row.prefix,
                        amount = %row.amount,
                        error = %e,
                        "Skipping unparseable constraint"
                    );
                }
            }
        }
        tracing::info!(
            curriculum = config.curriculum(),
            constraints = config.additional_constraints().len(),
            "Applied course configuration"
        );
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ConfigOutput {
    Ok,
    Invalid,
    Close,
    /// The panel's pending values were committed and it should close
    Applied,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DARK;

    fn semesters() -> Vec<String> {
        vec![String::from("24S"), String::from("23W")]
    }

    fn type_str(state: &mut ConfigMenuState, config: &mut Configuration, s: &str) {
        for c in s.chars() {
            assert_eq!(state.handle_key(KeyCode::Char(c), config, &[]), ConfigOutput::Ok);
        }
    }

    fn goto_field(state: &mut ConfigMenuState, field: Field) {
        state.field = field;
    }

    #[test]
    fn test_semester_and_objective_apply_at_once() {
        let mut config = Configuration::new();
        let mut state = ConfigMenuState::new(&config, &semesters());
        assert_eq!(state.semester, None);
        state.handle_key(KeyCode::Right, &mut config, &[]);
        assert_eq!(config.semester(), "24S");
        state.handle_key(KeyCode::Right, &mut config, &[]);
        assert_eq!(config.semester(), "23W");
        state.handle_key(KeyCode::Right, &mut config, &[]);
        assert_eq!(config.semester(), "24S");
        goto_field(&mut state, Field::Objective);
        state.handle_key(KeyCode::Left, &mut config, &[]);
        assert_eq!(config.objective(), "maximize_num_ects");
        state.handle_key(KeyCode::Right, &mut config, &[]);
        state.handle_key(KeyCode::Right, &mut config, &[]);
        assert_eq!(config.objective(), "minimize_gaps");
    }

    #[test]
    fn test_add_prefix_and_exclusion() {
        let mut config = Configuration::new();
        let mut state = ConfigMenuState::new(&config, &semesters());
        goto_field(&mut state, Field::Prefix);
        assert_eq!(
            state.handle_key(KeyCode::Enter, &mut config, &[]),
            ConfigOutput::Invalid
        );
        type_str(&mut state, &mut config, "IN");
        assert_eq!(state.handle_key(KeyCode::Enter, &mut config, &[]), ConfigOutput::Ok);
        type_str(&mut state, &mut config, "IN");
        state.handle_key(KeyCode::Enter, &mut config, &[]);
        assert_eq!(config.selected_prefixes(), ["IN", "IN"]);
        assert_eq!(state.constraints.len(), 1);
        state.handle_key(KeyCode::Tab, &mut config, &[]);
        type_str(&mut state, &mut config, "IN0001");
        state.handle_key(KeyCode::Enter, &mut config, &[]);
        assert_eq!(config.excluded_courses(), ["IN0001"]);
        assert!(state.excluded.is_empty());
    }

    #[test]
    fn test_apply_commits_enabled_constraints() {
        let mut config = Configuration::new();
        config.add_prefix("IN");
        config.add_prefix("MA");
        let mut state = ConfigMenuState::new(&config, &semesters());
        goto_field(&mut state, Field::Curriculum);
        type_str(&mut state, &mut config, "cs-bsc");
        assert_eq!(config.curriculum(), "");
        goto_field(&mut state, Field::Constraints);
        state.handle_key(KeyCode::Char(' '), &mut config, &[]);
        state.handle_key(KeyCode::Char('3'), &mut config, &[]);
        state.handle_key(KeyCode::Down, &mut config, &[]);
        // Digits are ignored while a row is disabled
        assert_eq!(
            state.handle_key(KeyCode::Char('7'), &mut config, &[]),
            ConfigOutput::Invalid
        );
        goto_field(&mut state, Field::Apply);
        assert_eq!(
            state.handle_key(KeyCode::Enter, &mut config, &[]),
            ConfigOutput::Applied
        );
        assert_eq!(config.curriculum(), "cs-bsc");
        assert_eq!(
            config.additional_constraints().iter().collect::<Vec<_>>(),
            [(&String::from("IN"), &3)]
        );
    }

    #[test]
    fn test_disabled_constraint_is_removed_on_apply() {
        let mut config = Configuration::new();
        config.add_prefix("IN");
        let mut state = ConfigMenuState::new(&config, &semesters());
        goto_field(&mut state, Field::Constraints);
        state.handle_key(KeyCode::Enter, &mut config, &[]);
        state.handle_key(KeyCode::Char('2'), &mut config, &[]);
        goto_field(&mut state, Field::Apply);
        state.handle_key(KeyCode::Enter, &mut config, &[]);
        assert_eq!(config.additional_constraints().get("IN"), Some(&2));

        let mut state = ConfigMenuState::new(&config, &semesters());
        assert!(state.constraints[0].enabled);
        goto_field(&mut state, Field::Constraints);
        state.handle_key(KeyCode::Char(' '), &mut config, &[]);
        goto_field(&mut state, Field::Apply);
        assert_eq!(
            state.handle_key(KeyCode::Enter, &mut config, &[]),
            ConfigOutput::Applied
        );
        assert!(config.additional_constraints().is_empty());
        assert_eq!(config.to_json()["additionalConstraints"], serde_json::json!({}));
        let state = ConfigMenuState::new(&config, &semesters());
        assert!(!state.constraints[0].enabled);
    }

    #[test]
    fn test_constraint_backspace() {
        let mut config = Configuration::new();
        config.add_prefix("IN");
        let mut state = ConfigMenuState::new(&config, &semesters());
        goto_field(&mut state, Field::Constraints);
        assert_eq!(
            state.handle_key(KeyCode::Backspace, &mut config, &[]),
            ConfigOutput::Invalid
        );
        state.handle_key(KeyCode::Char(' '), &mut config, &[]);
        state.handle_key(KeyCode::Char('4'), &mut config, &[]);
        state.handle_key(KeyCode::Char('2'), &mut config, &[]);
        assert_eq!(
            state.handle_key(KeyCode::Backspace, &mut config, &[]),
            ConfigOutput::Ok
        );
        assert_eq!(state.constraints[0].amount, "4");
        state.handle_key(KeyCode::Backspace, &mut config, &[]);
        assert_eq!(
            state.handle_key(KeyCode::Backspace, &mut config, &[]),
            ConfigOutput::Invalid
        );
    }

    #[test]
    fn test_reopen_restores_constraints() {
        let mut config = Configuration::new();
        config.add_prefix("IN");
        config.add_additional_constraint("IN", 2);
        config.set_objective("minimize_num_courses");
        config.set_semester("23W");
        let state = ConfigMenuState::new(&config, &semesters());
        assert_eq!(state.semester, Some(1));
        assert_eq!(state.objective, 2);
        assert_eq!(
            state.constraints,
            [ConstraintRow {
                prefix: String::from("IN"),
                enabled: true,
                amount: String::from("2"),
            }]
        );
    }

    #[test]
    fn test_department_fills_curriculum() {
        let departments = vec![
            String::from("TUS1000 51897 Department of Mathematics"),
            String::from("TUS2000 51898 Department of Informatics"),
        ];
        let mut config = Configuration::new();
        let mut state = ConfigMenuState::new(&config, &semesters());
        goto_field(&mut state, Field::Departments);
        state.handle_key(KeyCode::Down, &mut config, &departments);
        state.handle_key(KeyCode::Down, &mut config, &departments);
        assert_eq!(
            state.handle_key(KeyCode::Enter, &mut config, &departments),
            ConfigOutput::Ok
        );
        assert_eq!(state.curriculum, departments[1]);
    }

    #[test]
    fn test_render() {
        let mut config = Configuration::new();
        config.add_prefix("IN");
        let departments = vec![String::from("TUS1000 51897 Department of Mathematics")];
        let mut state = ConfigMenuState::new(&config, &semesters());
        let area = Rect::new(0, 0, 80, 30);
        let mut buf = Buffer::empty(area);
        ConfigMenu {
            config: &config,
            departments: &departments,
            theme: &DARK,
        }
        .render(area, &mut buf, &mut state);
        let screen = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_owned()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        for needle in [
            "‹ — ›",
            "[ ] at least",
            "courses with prefix 'IN'",
            "‹ noobjective ›",
            "Department of Mathematics",
            "[ Apply ]",
        ] {
            assert!(screen.iter().any(|row| row.contains(needle)), "{needle:?}");
        }
    }
}
