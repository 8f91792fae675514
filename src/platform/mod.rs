//! Platform abstraction layer
//!
//! The simulation never touches UI or audio directly. Hosts implement
//! `Presenter` and feed it the events drained from a `Match` each frame.

use crate::sim::{Match, MatchEvent, Music, Page};

/// Presentation callbacks the host engine provides
pub trait Presenter {
    fn show_page(&mut self, page: Page);
    fn hide_page(&mut self, page: Page);
    fn play_music(&mut self, track: Music);
    fn stop_music(&mut self, track: Music);

    /// Anything that isn't a page or music cue. Ignored by default.
    fn on_event(&mut self, _event: &MatchEvent) {}
}

/// Route events to the presenter in the order they were emitted
pub fn dispatch<P: Presenter + ?Sized>(events: &[MatchEvent], presenter: &mut P) {
    for event in events {
        match *event {
            MatchEvent::ShowPage(page) => presenter.show_page(page),
            MatchEvent::HidePage(page) => presenter.hide_page(page),
            MatchEvent::PlayMusic(track) => presenter.play_music(track),
            MatchEvent::StopMusic(track) => presenter.stop_music(track),
            _ => presenter.on_event(event),
        }
    }
}

/// Drain a match's queued events into `presenter`
pub fn flush<P: Presenter + ?Sized>(game: &mut Match, presenter: &mut P) {
    let events = game.drain_events();
    dispatch(&events, presenter);
}

/// Headless presenter that logs every cue
#[derive(Debug, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn show_page(&mut self, page: Page) {
        log::info!("Show page {:?}", page);
    }

    fn hide_page(&mut self, page: Page) {
        log::info!("Hide page {:?}", page);
    }

    fn play_music(&mut self, track: Music) {
        log::info!("Play music {:?}", track);
    }

    fn stop_music(&mut self, track: Music) {
        log::info!("Stop music {:?}", track);
    }

    fn on_event(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::LevelGenerated(layout) => {
                log::info!("Level built: {}", layout.template_names().join(" > "));
            }
            MatchEvent::MatchFinished(result) => log::info!("{}", result.message()),
            other => log::debug!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MatchSettings;
    use crate::sim::{MatchResult, MatchState, SectionDatabase};

    #[derive(Default)]
    struct Recorder {
        cues: Vec<String>,
        other: usize,
    }

    impl Presenter for Recorder {
        fn show_page(&mut self, page: Page) {
            self.cues.push(format!("show {:?}", page));
        }
        fn hide_page(&mut self, page: Page) {
            self.cues.push(format!("hide {:?}", page));
        }
        fn play_music(&mut self, track: Music) {
            self.cues.push(format!("play {:?}", track));
        }
        fn stop_music(&mut self, track: Music) {
            self.cues.push(format!("stop {:?}", track));
        }
        fn on_event(&mut self, _event: &MatchEvent) {
            self.other += 1;
        }
    }

    #[test]
    fn test_dispatch_keeps_order() {
        let events = vec![
            MatchEvent::HidePage(Page::MainMenu),
            MatchEvent::StopMusic(Music::Title),
            MatchEvent::MatchStarted,
            MatchEvent::PlayMusic(Music::Game),
        ];
        let mut recorder = Recorder::default();
        dispatch(&events, &mut recorder);
        assert_eq!(recorder.cues, vec!["hide MainMenu", "stop Title", "play Game"]);
        assert_eq!(recorder.other, 1);
    }

    #[test]
    fn test_flush_drains_match() {
        let database = SectionDatabase::builtin().unwrap();
        let mut game = Match::new(MatchSettings::default(), database).unwrap();
        let mut recorder = Recorder::default();
        flush(&mut game, &mut recorder);
        assert_eq!(recorder.cues, vec!["show MainMenu", "play Title"]);
        assert!(game.events().is_empty());

        game.set_state(MatchState::Game);
        game.finish(MatchResult::NoSurvivors);
        flush(&mut game, &mut recorder);
        let tail = &recorder.cues[recorder.cues.len() - 2..];
        assert_eq!(tail, ["show PostGame", "play End"]);
    }

    #[test]
    fn test_log_presenter_accepts_everything() {
        let mut presenter = LogPresenter;
        dispatch(
            &[
                MatchEvent::ShowPage(Page::CountdownTimer),
                MatchEvent::MatchFinished(MatchResult::Winner(0)),
            ],
            &mut presenter,
        );
    }
}
