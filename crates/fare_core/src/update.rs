use crate::{is_search_redirect, Effect, Msg, Phase, ScrapeState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not belong to the current phase are ignored.
pub fn update(mut state: ScrapeState, msg: Msg) -> (ScrapeState, Vec<Effect>) {
    let phase = state.phase();
    let effects = match msg {
        Msg::Start { url } if phase == Phase::Init => {
            state.begin(url.clone());
            vec![Effect::OpenSession { url }]
        }
        Msg::PageLoaded { current_url } if phase == Phase::Navigating => {
            state.enter(Phase::RedirectCheck);
            let redirected = state
                .requested_url()
                .map(|requested| is_search_redirect(requested, &current_url))
                .unwrap_or(false);
            if redirected {
                state.enter(Phase::SearchClick);
            } else {
                state.enter(Phase::Settling);
            }
            Vec::new()
        }
        Msg::SearchSubmitted { clicked } if phase == Phase::SearchClick => {
            state.record_search(clicked);
            state.enter(Phase::Settling);
            Vec::new()
        }
        Msg::Settled if phase == Phase::Settling => {
            state.take_session();
            state.enter(Phase::Enumerating);
            vec![Effect::CountRows]
        }
        Msg::RowsCounted(0) if phase == Phase::Enumerating => {
            state.start_rows(0);
            state.enter(Phase::Empty);
            finish_extraction(&mut state)
        }
        Msg::RowsCounted(total) if phase == Phase::Enumerating => {
            state.start_rows(total);
            state.enter(Phase::Extracting);
            vec![Effect::ExtractRow { index: 1 }]
        }
        Msg::RowFinished { index, extracted }
            if phase == Phase::Extracting && index == state.next_row() =>
        {
            state.finish_row(extracted);
            if index < state.rows_total() {
                vec![Effect::ExtractRow { index: index + 1 }]
            } else {
                finish_extraction(&mut state)
            }
        }
        Msg::PersistFinished { stored, failed } if phase == Phase::Persisting => {
            state.record_store(stored, failed);
            state.enter(Phase::Done);
            Vec::new()
        }
        Msg::Failed { reason } if !phase.is_terminal() => {
            state.fail(reason);
            state.release_session().into_iter().collect()
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn finish_extraction(state: &mut ScrapeState) -> Vec<Effect> {
    state.enter(Phase::Persisting);
    let mut effects: Vec<Effect> = state.release_session().into_iter().collect();
    effects.push(Effect::PersistRecords);
    effects
}
