//! EduSphere entry point
//!
//! Handles platform-specific initialization and runs the lab loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlInputElement, PointerEvent, WheelEvent};

    use edusphere::catalog::{find_class, find_subject, find_topic};
    use edusphere::consts::*;
    use edusphere::renderer::{OrbitCamera, SceneRenderState};
    use edusphere::sim::{LabEvent, LabState, ParticleStatus, TickInput, tick};
    use edusphere::ui;
    use edusphere::{LabError, Navigator, Settings, View};

    /// App state
    struct App {
        nav: Navigator,
        /// Present only while the lab screen is open
        lab: Option<LabState>,
        settings: Settings,
        render_state: Option<SceneRenderState>,
        camera: OrbitCamera,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Last pointer position while dragging the camera
        drag: Option<(f32, f32)>,
        canvas: HtmlCanvasElement,
        /// CSS pixel size of the canvas
        viewport: (f32, f32),
    }

    impl App {
        fn new(settings: Settings, canvas: HtmlCanvasElement) -> Self {
            Self {
                nav: Navigator::new(),
                lab: None,
                input: TickInput {
                    beam_speed: settings.beam_speed,
                    ..Default::default()
                },
                settings,
                render_state: None,
                camera: OrbitCamera::default(),
                accumulator: 0.0,
                last_time: 0.0,
                drag: None,
                canvas,
                viewport: (1.0, 1.0),
            }
        }

        /// Match the canvas and surface to the canvas's laid-out size
        fn fit_to_canvas(&mut self) {
            let (viewport, (width, height)) = fit_canvas(&self.canvas);
            self.viewport = viewport;
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height);
            }
        }

        /// Open a fresh lab with a new seed and camera
        fn open_lab(&mut self, seed: u64) {
            self.lab = Some(LabState::new(seed));
            self.camera = OrbitCamera::default();
            self.accumulator = 0.0;
            self.input = TickInput {
                beam_speed: self.settings.beam_speed,
                ..Default::default()
            };
            log::info!("Lab opened with seed: {}", seed);
        }

        fn close_lab(&mut self) {
            if let Some(lab) = self.lab.take() {
                log::info!(
                    "Lab closed after {} particles ({} deflected, {} rebounded)",
                    lab.stats.fired,
                    lab.stats.deflected,
                    lab.stats.rebounded
                );
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let Some(lab) = self.lab.as_mut() else {
                return;
            };
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(lab, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.pause = false;
                self.input.reset = false;

                for event in &lab.events {
                    match event {
                        LabEvent::Rebounded { id, nucleus } => {
                            log::debug!("Particle {} rebounded off nucleus {}", id, nucleus)
                        }
                        LabEvent::Deflected { id, nucleus } => {
                            log::debug!("Particle {} deflected by nucleus {}", id, nucleus)
                        }
                        LabEvent::Fired { .. } => {}
                    }
                }
            }

            self.camera.update();
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let (Some(render_state), Some(lab)) = (self.render_state.as_mut(), self.lab.as_ref())
            else {
                return;
            };
            match render_state.render(lab, &self.settings, &self.camera, time) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update the lab overlay in the DOM
        fn update_overlay(&self, document: &Document) {
            let Some(lab) = self.lab.as_ref() else {
                return;
            };

            for (id, text, width) in ui::analysis_rows(&lab.stats) {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&format!("{}%", text)));
                }
                if let Some(bar) = document.get_element_by_id(&format!("{}-bar", id)) {
                    let _ = bar.set_attribute("style", &format!("width:{:.1}%", width));
                }
            }

            if let Some(el) = document.get_element_by_id("pause-label") {
                el.set_text_content(Some(ui::pause_button_text(lab.is_paused())));
            }

            if let Some(el) = document.get_element_by_id("labels") {
                let labels =
                    ui::floating_labels(lab, &self.camera, self.viewport, self.settings.show_data_log);
                if let Err(e) = build_labels(document, &el, &labels) {
                    log::warn!("Failed to place labels: {:?}", e);
                }
            }
        }
    }

    fn document() -> Result<Document, LabError> {
        web_sys::window()
            .ok_or(LabError::MissingElement("window"))?
            .document()
            .ok_or(LabError::MissingElement("document"))
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_active(document: &Document, id: &str, active: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("active", active);
        }
    }

    /// Rebuild a picker screen's nodes inside `screen`
    fn build_picker(
        document: &Document,
        screen: &Element,
        picker: &ui::PickerScreen,
    ) -> Result<(), JsValue> {
        let title = document.create_element("h2")?;
        title.set_class_name(picker.title_class);
        title.set_text_content(Some(&picker.title));
        screen.append_child(&title)?;

        if let Some(subtitle) = &picker.subtitle {
            let el = document.create_element("p")?;
            el.set_class_name("screen-subtitle");
            el.set_text_content(Some(subtitle));
            screen.append_child(&el)?;
        }
        if picker.title_bar {
            let bar = document.create_element("div")?;
            bar.set_class_name("title-bar");
            screen.append_child(&bar)?;
        }

        let container = document.create_element("div")?;
        container.set_class_name(picker.container_class);
        if let Some(message) = picker.empty_message {
            let empty = document.create_element("div")?;
            empty.set_class_name("empty");
            empty.set_text_content(Some(message));
            container.append_child(&empty)?;
        }
        for card in &picker.cards {
            let button = document.create_element("button")?;
            button.set_class_name(&card.class);
            for (name, value) in &card.data {
                button.set_attribute(name, value)?;
            }
            for part in &card.parts {
                let el = document.create_element(part.tag)?;
                if !part.class.is_empty() {
                    el.set_class_name(&part.class);
                }
                if !part.text.is_empty() {
                    el.set_text_content(Some(&part.text));
                }
                button.append_child(&el)?;
            }
            container.append_child(&button)?;
        }
        screen.append_child(&container)?;
        Ok(())
    }

    /// Replace the overlay's label nodes
    fn build_labels(
        document: &Document,
        container: &Element,
        labels: &[ui::FloatingLabel],
    ) -> Result<(), JsValue> {
        container.set_text_content(None);
        for label in labels {
            let el = document.create_element("div")?;
            el.set_class_name(&label.class);
            el.set_attribute("style", &label.style())?;
            el.set_text_content(Some(label.text));
            container.append_child(&el)?;
        }
        Ok(())
    }

    /// Swap the picker screen and lab panel to match the current view
    fn show_view(app: &App, document: &Document) {
        let view = app.nav.view;

        if let Some(el) = document.get_element_by_id("header-subtitle") {
            el.set_text_content(Some(&app.nav.header_subtitle()));
        }
        set_hidden(document, "back-btn", !app.nav.can_go_back());

        let picker = match view {
            View::Dashboard => Some(ui::dashboard_screen()),
            View::SubjectDashboard => app.nav.class.as_ref().map(ui::subject_screen),
            View::TopicDashboard => app.nav.subject.as_ref().map(ui::topic_screen),
            View::Simulation => None,
        };
        if let Some(el) = document.get_element_by_id("screen") {
            el.set_text_content(None);
            let built = picker
                .as_ref()
                .map_or(Ok(()), |picker| build_picker(document, &el, picker));
            if let Err(e) = built {
                log::warn!("Failed to build picker: {:?}", e);
            }
        }

        set_hidden(document, "screen", view == View::Simulation);
        set_hidden(document, "lab", view != View::Simulation);
        sync_controls(&app.settings, document);
    }

    /// Reflect settings in the lab controls
    fn sync_controls(settings: &Settings, document: &Document) {
        if let Some(el) = document.get_element_by_id("speed-value") {
            el.set_text_content(Some(&ui::beam_speed_text(settings.beam_speed)));
        }
        if let Some(input) = document
            .get_element_by_id("speed-slider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&format!("{:.1}", settings.beam_speed));
        }
        if let Some(el) = document.get_element_by_id("quality-btn") {
            el.set_text_content(Some(&format!("Quality: {}", settings.quality.as_str())));
        }
        set_active(document, "orbitals-btn", settings.show_cloud);
        set_active(document, "stats-btn", settings.show_data_log);
        set_hidden(document, "analysis", !settings.show_data_log);

        for (id, status) in [
            ("legend-passed", ParticleStatus::Passed),
            ("legend-deflected", ParticleStatus::Deflected),
            ("legend-rebounded", ParticleStatus::Rebounded),
        ] {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.set_attribute("style", &ui::legend_style(status));
            }
        }
    }

    /// Resize the canvas backing store to its CSS size times the pixel ratio
    fn fit_canvas(canvas: &HtmlCanvasElement) -> ((f32, f32), (u32, u32)) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        ((client_w as f32, client_h as f32), (width, height))
    }

    pub async fn run() -> Result<(), LabError> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)?;

        log::info!("EduSphere starting...");

        let document = document()?;

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or(LabError::MissingElement("canvas"))?
            .dyn_into()
            .map_err(|_| LabError::WrongElementType("canvas"))?;

        let (viewport, (width, height)) = fit_canvas(&canvas);

        let settings = Settings::load();
        let app = Rc::new(RefCell::new(App::new(settings, canvas.clone())));
        app.borrow_mut().viewport = viewport;

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut render_state = SceneRenderState::new(surface, &adapter, width, height).await?;
        render_state.set_start_time(js_sys::Date::now());
        app.borrow_mut().render_state = Some(render_state);

        show_view(&app.borrow(), &document);

        setup_navigation(app.clone(), &document);
        setup_lab_controls(app.clone(), &document);
        setup_camera_input(&canvas, app.clone());
        setup_resize(app.clone());
        setup_auto_pause(app.clone(), &document);

        request_animation_frame(app);

        log::info!("EduSphere running!");
        Ok(())
    }

    fn add_click(el: &Element, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(handler);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_navigation(app: Rc<RefCell<App>>, document: &Document) {
        // Delegated picker clicks
        if let Some(screen) = document.get_element_by_id("screen") {
            let app = app.clone();
            let document = document.clone();
            add_click(&screen, move |event| {
                let Some(target) = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.closest("[data-action]").ok().flatten())
                else {
                    return;
                };
                let action = target.get_attribute("data-action").unwrap_or_default();

                let mut a = app.borrow_mut();
                match action.as_str() {
                    ui::ACTION_CLASS => {
                        let class = target
                            .get_attribute("data-class")
                            .and_then(|id| id.parse::<u8>().ok())
                            .and_then(find_class);
                        if let Some(class) = class {
                            a.nav.select_class(class);
                        }
                    }
                    ui::ACTION_SUBJECT => {
                        let subject = target
                            .get_attribute("data-subject")
                            .and_then(|id| find_subject(&id));
                        if let Some(subject) = subject {
                            a.nav.select_subject(subject);
                        }
                    }
                    ui::ACTION_TOPIC => {
                        let subject = target.get_attribute("data-subject").unwrap_or_default();
                        let topic = target
                            .get_attribute("data-topic")
                            .and_then(|id| find_topic(&subject, &id));
                        if let Some(topic) = topic {
                            a.nav.select_topic(topic);
                            a.open_lab(js_sys::Date::now() as u64);
                        }
                    }
                    other => log::warn!("Unknown action: {}", other),
                }
                log::info!("View: {:?}", a.nav.view);
                show_view(&a, &document);
                // The canvas only has a layout size once the lab is visible
                if a.nav.view == View::Simulation {
                    a.fit_to_canvas();
                }
            });
        }

        if let Some(btn) = document.get_element_by_id("back-btn") {
            let document = document.clone();
            add_click(&btn, move |_event| {
                let mut a = app.borrow_mut();
                if a.nav.view == View::Simulation {
                    a.close_lab();
                }
                a.nav.go_back();
                log::info!("View: {:?}", a.nav.view);
                show_view(&a, &document);
            });
        }
    }

    fn setup_lab_controls(app: Rc<RefCell<App>>, document: &Document) {
        if let Some(btn) = document.get_element_by_id("pause-btn") {
            let app = app.clone();
            add_click(&btn, move |_event| {
                app.borrow_mut().input.pause = true;
            });
        }

        if let Some(btn) = document.get_element_by_id("reset-btn") {
            let app = app.clone();
            add_click(&btn, move |_event| {
                app.borrow_mut().input.reset = true;
                log::info!("Lab reset");
            });
        }

        if let Some(btn) = document.get_element_by_id("orbitals-btn") {
            let app = app.clone();
            let document = document.clone();
            add_click(&btn, move |_event| {
                let mut a = app.borrow_mut();
                a.settings.show_cloud = !a.settings.show_cloud;
                a.settings.save();
                sync_controls(&a.settings, &document);
            });
        }

        if let Some(btn) = document.get_element_by_id("quality-btn") {
            let app = app.clone();
            let document = document.clone();
            add_click(&btn, move |_event| {
                let mut a = app.borrow_mut();
                a.settings.quality = a.settings.quality.next();
                a.settings.save();
                log::info!("Quality: {}", a.settings.quality.as_str());
                sync_controls(&a.settings, &document);
            });
        }

        if let Some(btn) = document.get_element_by_id("stats-btn") {
            let app = app.clone();
            let document = document.clone();
            add_click(&btn, move |_event| {
                let mut a = app.borrow_mut();
                a.settings.show_data_log = !a.settings.show_data_log;
                a.settings.save();
                sync_controls(&a.settings, &document);
            });
        }

        // Beam speed slider
        if let Some(slider) = document
            .get_element_by_id("speed-slider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let document = document.clone();
            let slider_clone = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Ok(speed) = slider_clone.value().parse::<f32>() else {
                    return;
                };
                let mut a = app.borrow_mut();
                a.settings.set_beam_speed(speed);
                a.input.beam_speed = a.settings.beam_speed;
                a.settings.save();
                if let Some(el) = document.get_element_by_id("speed-value") {
                    el.set_text_content(Some(&ui::beam_speed_text(a.settings.beam_speed)));
                }
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_camera_input(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Drag start
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                app.borrow_mut().drag = Some((event.client_x() as f32, event.client_y() as f32));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drag rotates
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                let Some((last_x, last_y)) = a.drag else {
                    return;
                };
                let (x, y) = (event.client_x() as f32, event.client_y() as f32);
                let height = a.viewport.1;
                // Dragging right swings the camera left around the target
                a.camera.rotate(-(x - last_x), y - last_y, height);
                a.drag = Some((x, y));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drag end
        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().drag = None;
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel zooms
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                app.borrow_mut().camera.zoom(event.delta_y() as f32);
            });
            let _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().fit_to_canvas();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>, document: &Document) {
        // Visibility change (tab switch, minimize)
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() != web_sys::VisibilityState::Hidden {
                return;
            }
            let mut a = app.borrow_mut();
            let running = a.lab.as_ref().is_some_and(|lab| !lab.is_paused());
            if a.settings.auto_pause && running {
                a.input.pause = true;
                log::info!("Auto-paused (tab hidden)");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            lab_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn lab_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render(time);
            if let Ok(document) = document() {
                a.update_overlay(&document);
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("EduSphere failed to start: {}", e);
        web_sys::console::error_1(&format!("EduSphere failed to start: {}", e).into());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("EduSphere (native) starting...");
    log::info!("Native mode runs the lab headless - run with `trunk serve` for the 3D view");

    run_headless(42, 60 * 60);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Run the lab without rendering and log the outcome split
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(seed: u64, ticks: u32) {
    use edusphere::consts::SIM_DT;
    use edusphere::sim::{LabState, TickInput, tick};

    let mut state = LabState::new(seed);
    let input = TickInput::default();
    for _ in 0..ticks {
        tick(&mut state, &input, SIM_DT);
    }

    let stats = state.stats;
    let formatted = stats.formatted();
    log::info!(
        "After {} ticks: {} fired, {} in flight",
        ticks,
        stats.fired,
        state.particles.len()
    );
    println!("Un-deflected (Empty Space): {}%", formatted.passed);
    println!("Deflected (Repulsion):      {}%", formatted.deflected);
    println!("Rebounded (Head-on):        {}%", formatted.rebounded);
}
