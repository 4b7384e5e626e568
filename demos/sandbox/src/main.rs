// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Herald Sandbox
// Embeds an aggregator into a small application host and drives it.

use std::sync::Arc;

use anyhow::{Context, Result};
use herald_core::{
    configure, AggregatorConfig, AppContainer, EmbedEvents, EventAggregator, LogSink,
    SupportsEvents,
};
use herald_telemetry::{init_logging, RecordingSink};

const SANDBOX_CONFIG: &str = r#"
log_target = "sandbox-events"
"#;

#[derive(Default)]
struct SandboxApp {
    name: String,
    events: EventAggregator,
}

impl SupportsEvents for SandboxApp {
    fn events(&self) -> &EventAggregator {
        &self.events
    }
}

impl EmbedEvents for SandboxApp {
    fn embed_events(&mut self, aggregator: EventAggregator) {
        self.events = aggregator;
    }
}

#[derive(Debug)]
struct WindowResized {
    width: u32,
    height: u32,
}

#[derive(Debug)]
struct FrameRendered(u64);

fn run_host_demo() -> Result<()> {
    let mut container = AppContainer::new(SandboxApp {
        name: "sandbox".into(),
        ..SandboxApp::default()
    });
    let events = configure(&mut container);

    let resolved = container
        .services()
        .resolve::<EventAggregator>()
        .context("aggregator was not registered")?;
    let app = container.host();

    app.subscribe("tick", |data, name| {
        if let Some(frame) = data.downcast_ref::<u64>() {
            log::info!("[{name}] frame {frame}");
        }
        Ok(())
    });
    resolved.subscribe_once("ready", |_, _| {
        log::info!("Application ready (only logged once).");
        Ok(())
    });
    app.subscribe_message(|resized: &WindowResized| {
        log::info!("Window resized to {}x{}.", resized.width, resized.height);
        Ok(())
    });
    let frames = app.subscribe_message(|frame: &FrameRendered| {
        log::debug!("Rendered {frame:?}.");
        Ok(())
    });

    log::info!("Host '{}' wired with {events:?}", app.name);

    for _ in 0..2 {
        app.events().publish_signal("ready");
    }
    for frame in 0..3u64 {
        events.publish("tick", &frame);
        app.publish_message(&FrameRendered(frame));
    }
    app.publish_message(&WindowResized {
        width: 1280,
        height: 720,
    });

    frames.dispose();
    app.publish_message(&FrameRendered(3));
    Ok(())
}

fn run_failure_demo() -> Result<()> {
    let config = AggregatorConfig::from_toml_str(SANDBOX_CONFIG)?;
    let recording = RecordingSink::forwarding_to(Arc::new(LogSink::new(
        config.log_target.clone(),
    )));
    let events = EventAggregator::builder()
        .config(config)
        .sink(recording.clone())
        .build();

    events.subscribe("save", |_, _| {
        log::info!("Not reached: a newer subscriber failed first.");
        Ok(())
    });
    events.subscribe("save", |data, _| {
        let path = data
            .downcast_ref::<&str>()
            .context("save expects a path")?;
        anyhow::bail!("cannot write {path}")
    });
    events.subscribe("crash", |_, _| panic!("subscriber bug"));

    events.publish("save", &"scene.toml");
    events.publish_signal("crash");

    for failure in recording.failures() {
        log::warn!("Recorded {} on {}: {}", failure.label, failure.channel, failure.message);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging("info");

    run_host_demo()?;
    run_failure_demo()?;
    Ok(())
}
