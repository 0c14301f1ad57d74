/// Terminal viewer for the nanorender software rasterizer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use nanorender_core::export::{self, ExportError};
use nanorender_core::{
    assets, Camera, CameraSettings, FrameStats, MathError, Mesh, MeshError, OrbitState,
    RenderContext, RenderError, RenderOptions, Rgba, Vec3f,
};
use std::io::{self, stdout, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod config;
pub mod renderer;

pub use config::{ConfigError, PresentStyle, ViewerConfig};
pub use renderer::TerminalPresenter;

/// Orbit drag applied per arrow key press, in pixels
const ARROW_STEP: f32 = 20.0;
const WIREFRAME_COLOR: Rgba = Rgba::new(0, 255, 128, 255);

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Load a mesh the way the viewer does: resolve it against the asset
/// directories, degrade to an empty mesh when the file can't be read, and
/// normalize it when asked. The second value describes a read failure;
/// malformed content is returned as an error.
pub fn load_model(path: &Path, config: &ViewerConfig) -> Result<(Mesh, Option<String>), MeshError> {
    let resolved = assets::locate(path, config.asset_depth).unwrap_or_else(|err| {
        log::debug!("{}", err);
        path.to_path_buf()
    });
    let load = Mesh::load_or_empty(&resolved)?;
    let problem = load.degraded.as_ref().map(|err| err.to_string());
    let mesh = if config.normalize {
        load.mesh.normalized()
    } else {
        load.mesh
    };
    Ok((mesh, problem))
}

/// Run every cleanup step, then report the first failure.
fn run_cleanup(steps: &[&dyn Fn() -> io::Result<()>]) -> io::Result<()> {
    let mut first = Ok(());
    for step in steps {
        let outcome = step();
        if first.is_ok() {
            first = outcome;
        }
    }
    first
}

/// Orbit camera aimed at the origin, with near and far planes hugging the
/// mesh so depth resolution is not wasted.
pub fn fitted_camera(
    mesh: &Mesh,
    orbit: &OrbitState,
    settings: &CameraSettings,
) -> Result<Camera, MathError> {
    let extent = mesh
        .bounds()
        .map(|b| b.min.map(f32::abs).component_max(b.max.map(f32::abs)).norm())
        .filter(|&e| e > 0.0)
        .unwrap_or(1.0);
    orbit.camera(Vec3f::zeros(), &settings.fit_depth(orbit.radius, extent))
}

/// Render one frame off-screen at the size given by `settings`
pub fn render_frame(
    mesh: &Mesh,
    orbit: &OrbitState,
    settings: &CameraSettings,
    options: RenderOptions,
) -> Result<(RenderContext, FrameStats), RenderError> {
    let (width, height) = (settings.width as usize, settings.height as usize);
    let mut context = RenderContext::new(width, height, options);
    let camera = fitted_camera(mesh, orbit, settings)?;
    let stats = context.render(mesh, &camera)?;
    Ok((context, stats))
}

/// `frame.png` → `frame-3.png`
fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("nanorender");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, n, ext),
        None => format!("{}-{}.png", stem, n),
    };
    path.with_file_name(name)
}

/// Interactive orbit viewer drawing into the terminal
pub struct TerminalApp {
    config: ViewerConfig,
    models: Vec<PathBuf>,
    current: usize,
    mesh: Mesh,
    orbit: OrbitState,
    context: RenderContext,
    presenter: TerminalPresenter,
    drag_from: Option<(u16, u16)>,
    status: Option<String>,
    stats: FrameStats,
    snapshots: usize,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: ViewerConfig) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_size(config, cols, rows))
    }

    /// Build the viewer for a terminal of `cols × rows` cells; the top row
    /// is kept for the status line.
    pub fn with_size(config: ViewerConfig, cols: u16, rows: u16) -> Self {
        let (width, height) = TerminalPresenter::frame_size(cols, rows.saturating_sub(1));
        let mut app = Self {
            models: config.model_list(),
            current: 0,
            mesh: Mesh::cube(2.0),
            orbit: config.orbit,
            context: RenderContext::new(width, height, config.render),
            presenter: TerminalPresenter::new(config.style),
            drag_from: None,
            status: None,
            stats: FrameStats::default(),
            snapshots: 0,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            config,
        };
        app.select_model(0);
        app
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Switch to entry `index` of the model list; with no models a cube is
    /// shown. A model that fails to parse leaves the current mesh in place.
    pub fn select_model(&mut self, index: usize) {
        let Some(path) = self.models.get(index).cloned() else {
            return;
        };
        match load_model(&path, &self.config) {
            Ok((mesh, problem)) => {
                self.current = index;
                self.mesh = mesh;
                self.status = problem;
                log::info!("showing {}", path.display());
            }
            Err(err) => {
                log::warn!("can't load {}: {}", path.display(), err);
                self.status = Some(format!("can't load {}: {}", path.display(), err));
            }
        }
    }

    pub fn run(&mut self) -> Result<(), ViewerError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        run_cleanup(&[
            &|| {
                execute!(
                    stdout(),
                    DisableMouseCapture,
                    terminal::LeaveAlternateScreen,
                    cursor::Show
                )
            },
            &terminal::disable_raw_mode,
        ])?;
        result?;

        if let Some(output) = self.config.output.clone() {
            self.export(&output)?;
        }
        Ok(())
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.config.fps.max(1) as u64);

        while self.running {
            let frame_start = Instant::now();

            // Drain pending input so drags don't lag behind
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.render_frame();
            self.draw()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Left => self.orbit.drag(-ARROW_STEP, 0.0),
            KeyCode::Right => self.orbit.drag(ARROW_STEP, 0.0),
            KeyCode::Up => self.orbit.drag(0.0, -ARROW_STEP),
            KeyCode::Down => self.orbit.drag(0.0, ARROW_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.orbit.zoom(1.0),
            KeyCode::Char('-') => self.orbit.zoom(-1.0),
            KeyCode::Char('f') => self.context.toggle_wireframe(WIREFRAME_COLOR),
            KeyCode::Char('r') => self.orbit = self.config.orbit,
            KeyCode::Char('p') => self.snapshot(),
            KeyCode::Char('n') | KeyCode::Tab if !self.models.is_empty() => {
                self.select_model((self.current + 1) % self.models.len());
            }
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    self.select_model(digit as usize - 1);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let cell = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.drag_from = Some(cell),
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((col, row)) = self.drag_from {
                    let dx = (cell.0 as f32 - col as f32) * self.config.drag_scale;
                    let dy = (cell.1 as f32 - row as f32) * self.config.drag_scale;
                    self.orbit.drag(dx, dy);
                }
                self.drag_from = Some(cell);
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_from = None,
            MouseEventKind::ScrollUp => self.orbit.zoom(1.0),
            MouseEventKind::ScrollDown => self.orbit.zoom(-1.0),
            _ => {}
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = TerminalPresenter::frame_size(cols, rows.saturating_sub(1));
        self.context.resize(width, height);
    }

    /// Render the current view into the terminal-sized buffers
    pub fn render_frame(&mut self) {
        let settings = CameraSettings {
            width: self.context.width() as u32,
            height: self.context.height() as u32,
            ..self.config.camera
        };
        let result = fitted_camera(&self.mesh, &self.orbit, &settings)
            .map_err(RenderError::from)
            .and_then(|camera| self.context.render(&self.mesh, &camera));
        match result {
            Ok(stats) => self.stats = stats,
            Err(err) => log::error!("frame aborted: {}", err),
        }
    }

    /// Render at the configured image size and save to `path`
    pub fn export(&self, path: &Path) -> Result<(), ViewerError> {
        let (context, _) = render_frame(
            &self.mesh,
            &self.orbit,
            &self.config.export_settings(),
            *self.context.options(),
        )?;
        export::save(context.color(), path)?;
        Ok(())
    }

    fn snapshot(&mut self) {
        self.snapshots += 1;
        let base = self
            .config
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("nanorender.png"));
        let path = numbered(&base, self.snapshots);
        self.status = Some(match self.export(&path) {
            Ok(()) => format!("saved {}", path.display()),
            Err(err) => {
                log::warn!("snapshot failed: {}", err);
                format!("snapshot failed: {}", err)
            }
        });
    }

    fn draw(&self) -> io::Result<()> {
        let mut stdout = stdout();
        self.presenter.draw(&mut stdout, self.context.color(), 1)?;

        let name = self
            .models
            .get(self.current)
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cube".to_string());
        let status = self.status.as_deref().unwrap_or(
            "drag=orbit wheel/+-=zoom arrows=turn f=wireframe p=snapshot 1-9/n=model q=quit",
        );
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | {} tris, {} drawn | FPS: {:.1} | {}",
                name, self.stats.triangles, self.stats.drawn, self.fps, status
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}
