use drape::cli::Args;
use drape::config::{self, DesignerSettings, PathConfig};
use drape::core::design_events::{
    AddFloatingImageEvent, ContextLostEvent, DropImageBytesEvent, PlaceImageEvent, SaveColorsEvent,
};
use drape::core::event_bus::{Event, EventBus};
use drape::core::gesture::GestureController;
use drape::core::image_loader::ImageLoader;
use drape::core::material_binder::MaterialBinder;
use drape::entities::color_store::{load_colors, save_colors};
use drape::entities::keys::{SETTINGS_FILE, STORE_FILE, LOG_FILE};
use drape::entities::{Design, JsonFileStore, Region, RegionRegistry, SceneConfig};
use drape::main_events::{self, DesignerState};
use drape::widgets::file_dialogs::{create_image_dialog, is_supported_image};
use drape::widgets::{preview, sidebar};

use anyhow::Context as _;
use clap::Parser;
use eframe::egui;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// UI state persisted by eframe between sessions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct UiState {
    selected: Region,
    scene: Option<SceneConfig>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected: Region::Front,
            scene: None,
        }
    }
}

/// Main application state
struct DrapeApp {
    design: Design,
    gestures: GestureController,
    loader: ImageLoader,
    binder: MaterialBinder,
    store: JsonFileStore,
    preview: preview::PreviewState,
    event_bus: EventBus,
    selected: Region,
    /// Color edits not yet written to the store
    colors_dirty: bool,
}

/// A dropped file: on-disk path, or raw bytes (web, some file managers).
enum Dropped {
    Path(PathBuf),
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl DrapeApp {
    fn new(settings: &DesignerSettings, store: JsonFileStore, loader: ImageLoader) -> Self {
        let mut design = Design::new(RegionRegistry::garment(), settings.limits);
        if let Some(colors) = load_colors(&store) {
            info!("Restored garment colors from {}", store.path().display());
            design.apply_colors(colors);
        }
        design.set_scene(settings.scene);
        Self {
            gestures: GestureController::new(settings.limits),
            binder: MaterialBinder::new(settings.placement),
            design,
            loader,
            store,
            preview: preview::PreviewState::new(settings.placement),
            event_bus: EventBus::new(),
            selected: Region::Front,
            colors_dirty: false,
        }
    }

    /// Drain finished decodes into the design.
    fn poll_loader(&mut self) -> bool {
        let results = self.loader.poll();
        let any = !results.is_empty();
        for res in results {
            match res.result {
                Ok(pixels) => {
                    self.design.mark_loaded(res.uuid, pixels);
                }
                Err(err) => {
                    self.design.mark_failed(res.uuid, err);
                }
            }
        }
        any
    }

    fn handle_events(&mut self) {
        let events = self.event_bus.poll();
        for event in events {
            let mut state = DesignerState {
                design: &mut self.design,
                gestures: &mut self.gestures,
                loader: &mut self.loader,
                binder: &mut self.binder,
                store: &mut self.store,
            };
            let Some(result) = main_events::handle_design_event(&event, &mut state) else {
                debug!("Unhandled event: {}", (*event).type_name());
                continue;
            };
            if let Some(reason) = result.context_lost {
                self.preview.lose_context(reason);
            }
            if result.reload {
                self.preview.reload();
            }
            if result.colors_changed {
                self.colors_dirty = true;
            }
            if let Some(region) = result.open_dialog {
                self.open_upload_dialog(region);
            }
        }
    }

    fn open_upload_dialog(&mut self, region: Option<Region>) {
        let title = match region {
            Some(r) => format!("Upload artwork for {}", r.display_name()),
            None => "Add floating image".to_string(),
        };
        let Some(path) = create_image_dialog(&title).pick_file() else {
            debug!("Upload dialog cancelled");
            return;
        };
        info!("Selected {}", path.display());
        match region {
            Some(region) => self.event_bus.emit(PlaceImageEvent { region, path }),
            None => self.event_bus.emit(AddFloatingImageEvent(path)),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<Dropped> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| match (&f.path, &f.bytes) {
                    (Some(path), _) => Some(Dropped::Path(path.clone())),
                    (None, Some(bytes)) => Some(Dropped::Bytes {
                        name: f.name.clone(),
                        bytes: Arc::clone(bytes),
                    }),
                    (None, None) => None,
                })
                .collect()
        });
        let mut first = true;
        for file in dropped {
            let supported = match &file {
                Dropped::Path(path) => is_supported_image(path),
                Dropped::Bytes { name, .. } => is_supported_image(Path::new(name)),
            };
            if !supported {
                match &file {
                    Dropped::Path(path) => warn!("Unsupported file dropped: {}", path.display()),
                    Dropped::Bytes { name, .. } => warn!("Unsupported file dropped: {}", name),
                }
                continue;
            }
            // first image goes on the selected region, the rest float
            let region = first.then_some(self.selected);
            first = false;
            match (file, region) {
                (Dropped::Path(path), Some(region)) => self.event_bus.emit(PlaceImageEvent { region, path }),
                (Dropped::Path(path), None) => self.event_bus.emit(AddFloatingImageEvent(path)),
                (Dropped::Bytes { name, bytes }, region) => {
                    self.event_bus.emit(DropImageBytesEvent { region, name, bytes })
                }
            }
        }
    }

    /// Write colors once the picker is released instead of on every drag step.
    fn flush_colors(&mut self, ctx: &egui::Context) {
        if self.colors_dirty && !ctx.input(|i| i.pointer.any_down()) {
            self.colors_dirty = false;
            self.event_bus.emit(SaveColorsEvent);
        }
    }

    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && self.gestures.is_active() {
            self.gestures.cancel();
        }
        // Debug aid for the context-loss path of the preview.
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::CTRL | egui::Modifiers::SHIFT, egui::Key::L)) {
            self.event_bus.emit(ContextLostEvent("simulated from keyboard".to_string()));
        }
    }
}

impl eframe::App for DrapeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.poll_loader() {
            ctx.request_repaint();
        }
        if self.loader.pending() > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        // Intents from the previous frame, then at most one gesture commit.
        self.handle_events();
        if let Some(commit) = self.gestures.take_frame_commit() {
            main_events::apply_commit(&mut self.design, &commit);
        }
        self.preview.apply(self.binder.sync(&self.design));

        self.handle_dropped_files(ctx);
        self.handle_hotkeys(ctx);
        self.flush_colors(ctx);

        let emitter = self.event_bus.emitter();
        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                sidebar::render(ui, &self.design, &mut self.selected).dispatch(&emitter);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                preview::render(ui, &mut self.preview, &self.design, &mut self.gestures, &mut self.selected)
                    .dispatch(&emitter);
            });

        if self.event_bus.queue_len() > 0 || self.gestures.is_active() {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = UiState {
            selected: self.selected,
            scene: Some(*self.design.scene()),
        };
        if let Ok(json) = serde_json::to_string(&state) {
            storage.set_string(eframe::APP_KEY, json);
            debug!("UI state saved: {:?}", state);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.gestures.cancel();
        if let Err(e) = save_colors(&mut self.store, &self.design.colors()) {
            warn!("Failed to save colors on exit: {:#}", e);
        }
    }
}

/// Decode synchronously and print the descriptors every region would get.
fn dump_materials(args: &Args, settings: &DesignerSettings, store: &JsonFileStore) -> anyhow::Result<()> {
    let mut design = Design::new(RegionRegistry::garment(), settings.limits);
    if let Some(colors) = load_colors(store) {
        design.apply_colors(colors);
    }
    design.set_scene(settings.scene);

    if let Some(path) = &args.image {
        main_events::place_image_blocking(&mut design, args.region, path);
    }

    let binder = MaterialBinder::new(settings.placement);
    let json = serde_json::to_string_pretty(&binder.derive(&design)).context("Failed to serialize materials")?;
    println!("{}", json);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    // Ensure directories exist
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // Initialize logger based on --log flag
    let log_file = args.log_file.as_ref().and_then(|log_path_opt| {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file(LOG_FILE, &path_config));
        match std::fs::File::create(&log_path) {
            Ok(file) => Some((log_path, file)),
            Err(e) => {
                eprintln!("Warning: Failed to create log file {}: {}", log_path.display(), e);
                None
            }
        }
    });

    if let Some((log_path, file)) = log_file {
        // File logging with specified verbosity level
        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }

    info!("Drape apparel mockup designer starting...");
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file(SETTINGS_FILE, &path_config);
    let store_path = config::data_file(STORE_FILE, &path_config);
    info!("Settings path: {}", settings_path.display());
    info!("Store path: {}", store_path.display());

    let settings = DesignerSettings::load(&settings_path);
    let store = JsonFileStore::new(store_path);

    if args.dump_materials {
        dump_materials(&args, &settings, &store)?;
        return Ok(());
    }

    let loader = ImageLoader::new()?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Drape v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1280.0, 800.0])
            .with_resizable(true)
            .with_drag_and_drop(true),
        persist_window: true,
        persistence_path: Some(config::config_file("drape_window.ron", &path_config)),
        ..Default::default()
    };

    eframe::run_native(
        "Drape",
        native_options,
        Box::new(move |cc| {
            let mut app = DrapeApp::new(&settings, store, loader);

            // Restore last session's region and scene if available
            let ui_state: UiState = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default();
            app.selected = ui_state.selected;
            if let Some(scene) = ui_state.scene {
                app.design.set_scene(scene);
            }

            if let Some(path) = &args.image {
                info!("Input image: {} on {}", path.display(), args.region);
                app.selected = args.region;
                app.event_bus.emit(PlaceImageEvent {
                    region: args.region,
                    path: path.clone(),
                });
            } else {
                info!("No input image provided, starting empty (drag-and-drop supported)");
            }

            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
