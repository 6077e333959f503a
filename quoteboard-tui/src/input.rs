use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.quote`(...) with the shipment form
    RequestQuote,
    /// Run `service.metrics`(...) and `service.recent_quotes`(...) for the current window
    RefreshMetrics,
}

// Step used by +/- on the metrics screen.
const WINDOW_STEP: usize = 5;

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global quit shortcut
    if key.code == Char('c') && control {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Shipment => match key.code {
            Up | BackTab => app.focus_previous(),
            Down => app.focus_next(),
            Char('a') if control => match app.form.add_volume() {
                Ok(()) => {
                    app.error_message = Some(format!(
                        "Volume added ({} in shipment)",
                        app.form.volumes.len()
                    ));
                }
                Err(err) => app.error_message = Some(err),
            },
            Char('x') if control => {
                app.form.volumes.clear();
                app.error_message = None;
            }
            Char(character) => {
                if !control && !key.modifiers.contains(KeyModifiers::ALT) {
                    let field = app.focused_field();
                    app.form.value_mut(field).push(character);
                }
            }
            Backspace => {
                let field = app.focused_field();
                app.form.value_mut(field).pop();
            }
            Enter => {
                action = Action::RequestQuote;
            }
            Right => {
                if app.last_quote.is_some() {
                    app.screen = Screen::Offers;
                }
            }
            Tab => {
                app.screen = Screen::Metrics;
                action = Action::RefreshMetrics;
            }
            Esc => {
                action = Action::Quit;
            }
            _ => {}
        },

        Screen::Offers => match key.code {
            Char('q') => action = Action::Quit,
            Left | Esc | Char('b') => {
                app.screen = Screen::Shipment;
            }
            Tab | Char('m') => {
                app.screen = Screen::Metrics;
                action = Action::RefreshMetrics;
            }
            _ => {}
        },

        Screen::Metrics => match key.code {
            Char('q') => action = Action::Quit,
            Up | Char('+') => {
                app.metrics_window = app.metrics_window.saturating_add(WINDOW_STEP);
                action = Action::RefreshMetrics;
            }
            Down | Char('-') => {
                app.metrics_window = app.metrics_window.saturating_sub(WINDOW_STEP);
                action = Action::RefreshMetrics;
            }
            Char('0') => {
                app.metrics_window = 0;
                action = Action::RefreshMetrics;
            }
            Char('r') => {
                action = Action::RefreshMetrics;
            }
            Left | Esc | Char('b') | Tab => {
                app.screen = Screen::Shipment;
            }
            _ => {}
        },
    }
    action
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quoteboard_core::{service::QuoteService, store::InMemoryQuoteStore};
    use quoteboard_provider_freterapido::{FreteRapidoConfig, rate_port};
    use reqwest::Client;

    use super::*;
    use crate::app::FormField;

    fn app() -> App {
        let rates = rate_port(Client::new(), FreteRapidoConfig::new("1", "2", "3", 4));
        let service = QuoteService::new(rates, Arc::new(InMemoryQuoteStore::new()));
        App::new(Arc::new(service), 10)
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    fn press_control(app: &mut App, character: char) -> Action {
        handle_key_event(
            KeyEvent::new(KeyCode::Char(character), KeyModifiers::CONTROL),
            app,
        )
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focused_field(), FormField::Category);

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('3'));

        assert_eq!(app.form.category, "3");
    }

    #[test]
    fn q_is_text_on_the_shipment_screen() {
        let mut app = app();
        app.field_index = 5;

        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::None);
        assert!(app.form.sku.ends_with('q'));
    }

    #[test]
    fn focus_wraps_around() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focused_field(), FormField::Length);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focused_field(), FormField::Zipcode);
    }

    #[test]
    fn control_a_adds_a_volume_and_control_x_clears() {
        let mut app = app();
        press_control(&mut app, 'a');
        press_control(&mut app, 'a');
        assert_eq!(app.form.volumes.len(), 2);

        press_control(&mut app, 'x');
        assert!(app.form.volumes.is_empty());
    }

    #[test]
    fn enter_requests_a_quote() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Enter), Action::RequestQuote);
    }

    #[test]
    fn metrics_window_adjusts_and_refreshes() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Tab), Action::RefreshMetrics);
        assert_eq!(app.screen, Screen::Metrics);

        assert_eq!(press(&mut app, KeyCode::Char('+')), Action::RefreshMetrics);
        assert_eq!(app.metrics_window, 15);

        for _ in 0..5 {
            press(&mut app, KeyCode::Char('-'));
        }
        assert_eq!(app.metrics_window, 0);
        assert_eq!(app.window_label(), "all quotes");
    }

    #[test]
    fn offers_screen_needs_a_quote() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.screen, Screen::Shipment);
    }

    #[test]
    fn control_c_quits_everywhere() {
        for screen in [Screen::Shipment, Screen::Offers, Screen::Metrics] {
            let mut app = app();
            app.screen = screen;
            assert_eq!(press_control(&mut app, 'c'), Action::Quit);
        }
    }
}
