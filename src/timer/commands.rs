use crate::{
    timer::{TimerController, TimerState},
    vibe::PresetId,
    AppState,
};

fn controller_from_state(state: &AppState) -> TimerController {
    state.timer.clone()
}

pub fn get_timer_state(state: &AppState) -> TimerState {
    controller_from_state(state).get_state()
}

pub async fn start_timer(state: &AppState, minutes: u32) -> Result<TimerState, String> {
    if minutes == 0 {
        return Err("timer needs at least one minute".to_string());
    }
    Ok(controller_from_state(state).start_timer(minutes).await)
}

pub async fn stop_timer(state: &AppState) -> Result<(), String> {
    controller_from_state(state).stop_timer().await;
    Ok(())
}

pub async fn apply_preset(state: &AppState, preset_id: &str) -> Result<TimerState, String> {
    let preset: PresetId = preset_id.parse()?;
    Ok(controller_from_state(state).apply_preset(preset).await)
}
