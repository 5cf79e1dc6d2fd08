use crossterm::event::KeyCode;

use crate::app::state::App;

pub fn handle_input(app: &mut App, key: KeyCode) {
    if handle_help_toggle(app, key) {
        return;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.running = false;
        }
        KeyCode::Up => app.select_prev_filter(),
        KeyCode::Down => app.select_next_filter(),
        KeyCode::Left => app.cycle_option(-1),
        KeyCode::Right => app.cycle_option(1),
        KeyCode::Backspace | KeyCode::Delete => app.clear_selected_filter(),
        KeyCode::Tab => app.next_chart_tab(),
        KeyCode::BackTab => app.prev_chart_tab(),
        KeyCode::Char('r') => app.force_refetch(),
        KeyCode::Char('x') => app.reset_filters(),
        KeyCode::Home => app.selected_filter = 0,
        KeyCode::End => app.selected_filter = crate::domain::FilterField::ALL.len() - 1,
        KeyCode::Char(c @ '1'..='9') => {
            // Digits jump straight to a filter row.
            app.selected_filter = (c as usize) - ('1' as usize);
        }
        _ => {}
    }
}

fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if key == KeyCode::F(1) || key == KeyCode::Char('?') {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterField;

    #[test]
    fn digits_jump_to_filter_rows() {
        let mut app = App::new();
        handle_input(&mut app, KeyCode::Char('4'));
        assert_eq!(app.selected_field(), FilterField::Region);
        handle_input(&mut app, KeyCode::Char('9'));
        assert_eq!(app.selected_field(), FilterField::City);
    }

    #[test]
    fn help_swallows_navigation_keys() {
        let mut app = App::new();
        handle_input(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        let selected = app.selected_filter;
        handle_input(&mut app, KeyCode::Down);
        assert_eq!(app.selected_filter, selected);

        handle_input(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(app.running);
    }
}
