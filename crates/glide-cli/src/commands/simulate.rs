use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use glide_core::headless::{EventLog, HeadlessEngine, HeadlessPage};
use glide_core::{Completion, GlideConfig, Mode, ScrollEvent, Scroller};

type Driver = Scroller<HeadlessPage, HeadlessEngine, EventLog>;

const DEFAULT_FRAME: f64 = 1.0 / 60.0;
const SETTLE_LIMIT: usize = 10_000;

/// Input script
///
/// ```toml
/// [[step]]
/// action = "wheel"
/// delta = 240
///
/// [[step]]
/// action = "settle"
/// ```
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Step {
    Wheel {
        delta: f64,
    },
    Frames {
        count: usize,
        #[serde(default = "default_frame")]
        dt: f64,
    },
    /// Run frames until the frame loop and any native scroll animation stop
    Settle {
        #[serde(default = "default_frame")]
        dt: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
    NativeScroll {
        value: f64,
    },
    ScrollTo {
        value: f64,
        #[serde(default)]
        animated: bool,
        #[serde(default)]
        wait: bool,
    },
    ScrollToEl {
        id: String,
    },
    Mode {
        smooth: bool,
    },
    Disable,
    Enable,
    TransitionIn,
    TransitionOut,
    CustomOut,
    Reset,
    Restart,
}

fn default_frame() -> f64 {
    DEFAULT_FRAME
}

/// One line of output
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Line<'a> {
    Event {
        frame: usize,
        event: &'static str,
        #[serde(flatten)]
        payload: ScrollEvent,
    },
    Completed {
        frame: usize,
        completed: &'a str,
        ok: bool,
    },
}

struct Pending {
    label: String,
    completion: Completion,
}

pub fn run(config: GlideConfig, page: &Path, script: &Path, native: bool) -> Result<()> {
    let page = HeadlessPage::load(page)
        .with_context(|| format!("Failed to load page {}", page.display()))?;
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let script: Script = toml::from_str(&content)
        .with_context(|| format!("Failed to parse script {}", script.display()))?;

    let smooth = config.scroll.smooth && !native;
    let mut scroller = Scroller::new(config, page, HeadlessEngine::new(), EventLog::new());
    if !scroller.init(smooth, None) {
        bail!("Page has no scroll section");
    }

    let mut frame = 0;
    let mut pending: Vec<Pending> = Vec::new();
    flush(&mut scroller, frame, &mut pending)?;

    for (index, step) in script.steps.into_iter().enumerate() {
        tracing::debug!(index, ?step, "Step");
        match step {
            Step::Wheel { delta } => {
                scroller.on_wheel(delta);
            }
            Step::Frames { count, dt } => {
                for _ in 0..count {
                    scroller.advance_frame(dt);
                    frame += 1;
                    flush(&mut scroller, frame, &mut pending)?;
                }
            }
            Step::Settle { dt } => {
                let mut frames = 0;
                while frames < SETTLE_LIMIT
                    && (scroller.is_ticking()
                        || scroller.engine().is_scrolling()
                        || scroller.engine().running() > 0)
                {
                    scroller.advance_frame(dt);
                    frame += 1;
                    frames += 1;
                    flush(&mut scroller, frame, &mut pending)?;
                }
                if frames == SETTLE_LIMIT {
                    tracing::warn!(frames, "Settle step hit the frame limit");
                }
            }
            Step::Resize { width, height } => {
                scroller.viewport_mut().set_window(width, height);
                scroller.on_resize();
            }
            Step::NativeScroll { value } => scroller.native_scroll(value),
            Step::ScrollTo {
                value,
                animated,
                wait,
            } => {
                let completion = scroller.scroll_to(value, animated, wait);
                pending.push(Pending {
                    label: format!("scroll_to {}", value),
                    completion,
                });
            }
            Step::ScrollToEl { id } => {
                if !scroller.scroll_to_el(&id) {
                    tracing::warn!(id = %id, "scroll_to_el: no such element");
                }
            }
            Step::Mode { smooth } => scroller.set_mode(Mode::from_smooth(smooth)),
            Step::Disable => scroller.disable_scroll(),
            Step::Enable => scroller.enable_scroll(),
            Step::TransitionIn => pending.push(Pending {
                label: "transition_in".to_string(),
                completion: scroller.transition_in_all(),
            }),
            Step::TransitionOut => pending.push(Pending {
                label: "transition_out".to_string(),
                completion: scroller.transition_out_all(),
            }),
            Step::CustomOut => pending.push(Pending {
                label: "custom_out".to_string(),
                completion: scroller.custom_out_all(),
            }),
            Step::Reset => scroller.reset(),
            Step::Restart => scroller.start(),
        }
        flush(&mut scroller, frame, &mut pending)?;
    }

    scroller.destroy();
    flush(&mut scroller, frame, &mut pending)?;
    Ok(())
}

/// Print recorded events and any completion that finished since the last call
fn flush(scroller: &mut Driver, frame: usize, pending: &mut Vec<Pending>) -> Result<()> {
    for payload in scroller.events_mut().take() {
        print_line(&Line::Event {
            frame,
            event: ScrollEvent::NAME,
            payload,
        })?;
    }

    let mut index = 0;
    while index < pending.len() {
        match pending[index].completion.check() {
            None => index += 1,
            Some(outcome) => {
                let done = pending.remove(index);
                print_line(&Line::Completed {
                    frame,
                    completed: &done.label,
                    ok: outcome.is_ok(),
                })?;
            }
        }
    }
    Ok(())
}

fn print_line(line: &Line<'_>) -> Result<()> {
    println!("{}", serde_json::to_string(line)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_parses_every_action() {
        let script: Script = toml::from_str(
            r#"
            [[step]]
            action = "wheel"
            delta = 240

            [[step]]
            action = "frames"
            count = 3

            [[step]]
            action = "scroll_to"
            value = 500
            animated = true
            wait = true

            [[step]]
            action = "scroll_to_el"
            id = "hero"

            [[step]]
            action = "mode"
            smooth = false

            [[step]]
            action = "transition_out"

            [[step]]
            action = "settle"
            "#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 7);
        assert!(matches!(script.steps[1], Step::Frames { count: 3, dt } if dt == DEFAULT_FRAME));
        assert!(matches!(
            script.steps[2],
            Step::ScrollTo { animated: true, wait: true, .. }
        ));
        assert!(matches!(script.steps[5], Step::TransitionOut));
    }

    #[test]
    fn test_event_line_is_flat_json() {
        let line = Line::Event {
            frame: 4,
            event: ScrollEvent::NAME,
            payload: ScrollEvent {
                pos: 12.5,
                dir: -1,
                elasticity: 0.075,
                size: Default::default(),
            },
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&line).unwrap()).unwrap();
        assert_eq!(json["frame"], 4);
        assert_eq!(json["event"], "scrolling");
        assert_eq!(json["pos"], 12.5);
        assert_eq!(json["dir"], -1);
    }
}
