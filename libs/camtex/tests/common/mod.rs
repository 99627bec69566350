//! Recording fakes for every collaborator of `NativeCamera`.
//!
//! All fakes append to one shared [`Journal`] so tests can compare the exact
//! collaborator call sequence, and each keeps a live-handle count so tests can
//! check that nothing leaks.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use camtex::{
    BeforeRenderTask, BoxFuture, CameraConfig, CameraDeviceHandle, CameraError, CameraId,
    CameraManagerHandle, CameraPlatform, CaptureEventHandler, CaptureFailure,
    CaptureRequestHandle, CaptureSessionHandle, DeviceContext, DiagnosticSink,
    EngineTextureHandle, ExternalImageHandle, FramebufferId, GlContextHandle, GlesDevice,
    GraphicsApi, ImageSurfaceHandle, LensFacing, NativeCamera, NativeTextureId,
    NativeWindowHandle, OutputContainerHandle, OutputTargetHandle, PermissionGate, ProgramId,
    Result, SessionOutputHandle, TextureFilter, TextureRegistry, TextureTarget,
};

// =============================================================================
// Journal
// =============================================================================

#[derive(Default, Clone)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn since(&self, mark: usize) -> Vec<String> {
        self.entries.lock()[mark..].to_vec()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.lock().iter().any(|e| e == entry)
    }
}

// =============================================================================
// EGL
// =============================================================================

pub struct FakeEgl {
    journal: Journal,
    next: AtomicUsize,
    pub current: Mutex<Option<GlContextHandle>>,
    pub live: Mutex<Vec<GlContextHandle>>,
    pub fail_create: Mutex<bool>,
    /// Refuse to make this context current.
    pub refuse: Mutex<Option<GlContextHandle>>,
}

impl FakeEgl {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            next: AtomicUsize::new(0x100),
            current: Mutex::new(None),
            live: Mutex::new(Vec::new()),
            fail_create: Mutex::new(false),
            refuse: Mutex::new(None),
        }
    }

    pub fn set_current(&self, context: Option<GlContextHandle>) {
        *self.current.lock() = context;
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }
}

impl GraphicsApi for FakeEgl {
    fn current_context(&self) -> Option<GlContextHandle> {
        *self.current.lock()
    }

    fn create_shared_context(&self, share_with: Option<GlContextHandle>) -> Result<GlContextHandle> {
        self.journal.record(format!("egl.create({:?})", share_with));
        if *self.fail_create.lock() {
            return Err(CameraError::Gpu("EGL_BAD_MATCH".into()));
        }
        let context = GlContextHandle::from_raw(self.next.fetch_add(1, Ordering::SeqCst));
        self.live.lock().push(context);
        Ok(context)
    }

    fn make_current(&self, context: Option<GlContextHandle>) -> Result<()> {
        self.journal.record(format!("egl.make_current({:?})", context));
        if context.is_some() && *self.refuse.lock() == context {
            return Err(CameraError::Gpu("EGL_BAD_ACCESS".into()));
        }
        *self.current.lock() = context;
        Ok(())
    }

    fn destroy_context(&self, context: GlContextHandle) -> Result<()> {
        self.journal.record(format!("egl.destroy({})", context));
        self.live.lock().retain(|c| *c != context);
        Ok(())
    }
}

// =============================================================================
// GLES
// =============================================================================

pub struct FakeGl {
    journal: Journal,
    next: AtomicUsize,
    pub textures: Mutex<Vec<NativeTextureId>>,
    pub framebuffers: Mutex<Vec<FramebufferId>>,
    pub programs: Mutex<Vec<ProgramId>>,
    pub fail_program: Mutex<bool>,
    pub draws: AtomicUsize,
}

impl FakeGl {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            next: AtomicUsize::new(1),
            textures: Mutex::new(Vec::new()),
            framebuffers: Mutex::new(Vec::new()),
            programs: Mutex::new(Vec::new()),
            fail_program: Mutex::new(false),
            draws: AtomicUsize::new(0),
        }
    }

    fn name(&self) -> u32 {
        self.next.fetch_add(1, Ordering::SeqCst) as u32
    }

    pub fn live_count(&self) -> usize {
        self.textures.lock().len() + self.framebuffers.lock().len() + self.programs.lock().len()
    }
}

impl GlesDevice for FakeGl {
    fn gen_texture(&self) -> Result<NativeTextureId> {
        let texture = NativeTextureId::from_raw(self.name());
        self.journal.record(format!("gl.gen_texture -> {}", texture));
        self.textures.lock().push(texture);
        Ok(texture)
    }

    fn delete_texture(&self, texture: NativeTextureId) {
        self.journal.record(format!("gl.delete_texture({})", texture));
        self.textures.lock().retain(|t| *t != texture);
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<NativeTextureId>) {
        self.journal
            .record(format!("gl.bind_texture({:?}, {:?})", target, texture));
    }

    fn set_texture_filter(&self, target: TextureTarget, filter: TextureFilter) {
        self.journal
            .record(format!("gl.texture_filter({:?}, {:?})", target, filter));
    }

    fn allocate_rgba8(&self, width: u32, height: u32) {
        self.journal.record(format!("gl.allocate_rgba8({}x{})", width, height));
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        self.journal.record(format!("gl.generate_mipmap({:?})", target));
    }

    fn gen_framebuffer(&self) -> Result<FramebufferId> {
        let framebuffer = FramebufferId::from_raw(self.name());
        self.journal.record(format!("gl.gen_framebuffer -> {}", framebuffer));
        self.framebuffers.lock().push(framebuffer);
        Ok(framebuffer)
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.journal
            .record(format!("gl.delete_framebuffer({})", framebuffer));
        self.framebuffers.lock().retain(|f| *f != framebuffer);
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        self.journal
            .record(format!("gl.bind_framebuffer({:?})", framebuffer));
    }

    fn attach_color_texture(&self, texture: NativeTextureId) {
        self.journal.record(format!("gl.attach({})", texture));
    }

    fn framebuffer_complete(&self) -> bool {
        true
    }

    fn create_program(&self, _vertex: &str, _fragment: &str) -> Result<ProgramId> {
        self.journal.record("gl.create_program");
        if *self.fail_program.lock() {
            return Err(CameraError::Gpu("fragment shader compile failed".into()));
        }
        let program = ProgramId::from_raw(self.name());
        self.programs.lock().push(program);
        Ok(program)
    }

    fn delete_program(&self, program: ProgramId) {
        self.journal.record(format!("gl.delete_program({})", program));
        self.programs.lock().retain(|p| *p != program);
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.journal.record(format!("gl.use_program({:?})", program));
    }

    fn uniform_location(&self, _program: ProgramId, _name: &str) -> Option<i32> {
        Some(0)
    }

    fn set_uniform_i32(&self, location: i32, value: i32) {
        self.journal.record(format!("gl.uniform({}, {})", location, value));
    }

    fn active_texture(&self, unit: u32) {
        self.journal.record(format!("gl.active_texture({})", unit));
    }

    fn unbind_sampler(&self, unit: u32) {
        self.journal.record(format!("gl.unbind_sampler({})", unit));
    }

    fn viewport(&self, width: u32, height: u32) {
        self.journal.record(format!("gl.viewport({}x{})", width, height));
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        self.journal.record(format!("gl.draw_strip({}, {})", first, count));
        self.draws.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Camera subsystem
// =============================================================================

pub struct FakeCamera {
    journal: Journal,
    next: AtomicUsize,
    pub api_level: u32,
    pub lenses: Vec<(CameraId, LensFacing)>,
    pub live: Mutex<HashMap<&'static str, i64>>,
    pub opened: Mutex<Vec<CameraId>>,
    pub fail_at: Mutex<Option<&'static str>>,
    pub fail_release: Mutex<Option<&'static str>>,
    pub events: Mutex<Option<Arc<dyn CaptureEventHandler>>>,
    pub latches: AtomicUsize,
    pub queue_depth: Mutex<Option<u32>>,
}

impl FakeCamera {
    /// Front, back, back.
    pub fn new(journal: Journal) -> Self {
        Self::with_lenses(
            journal,
            vec![
                ("0".into(), LensFacing::Front),
                ("1".into(), LensFacing::Back),
                ("2".into(), LensFacing::Back),
            ],
        )
    }

    pub fn with_lenses(journal: Journal, lenses: Vec<(CameraId, LensFacing)>) -> Self {
        Self {
            journal,
            next: AtomicUsize::new(0x1000),
            api_level: 30,
            lenses,
            live: Mutex::new(HashMap::new()),
            opened: Mutex::new(Vec::new()),
            fail_at: Mutex::new(None),
            fail_release: Mutex::new(None),
            events: Mutex::new(None),
            latches: AtomicUsize::new(0),
            queue_depth: Mutex::new(None),
        }
    }

    pub fn with_api_level(mut self, level: u32) -> Self {
        self.api_level = level;
        self
    }

    /// Handles acquired and not yet released, over every kind.
    pub fn outstanding(&self) -> i64 {
        self.live.lock().values().map(|n| n.abs()).sum()
    }

    fn acquire(&self, kind: &'static str) -> Result<usize> {
        self.journal.record(format!("camera.{}", kind));
        if *self.fail_at.lock() == Some(kind) {
            return Err(CameraError::Capture(format!("{} failed", kind)));
        }
        *self.live.lock().entry(kind).or_default() += 1;
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn release(&self, kind: &'static str, call: &'static str) -> Result<()> {
        self.journal.record(format!("camera.{}", call));
        *self.live.lock().entry(kind).or_default() -= 1;
        if *self.fail_release.lock() == Some(call) {
            return Err(CameraError::Capture(format!("{} failed", call)));
        }
        Ok(())
    }

    fn step(&self, call: &'static str) -> Result<()> {
        self.journal.record(format!("camera.{}", call));
        if *self.fail_at.lock() == Some(call) {
            return Err(CameraError::Capture(format!("{} failed", call)));
        }
        Ok(())
    }
}

impl CameraPlatform for FakeCamera {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn create_manager(&self) -> Result<CameraManagerHandle> {
        self.acquire("manager").map(CameraManagerHandle::from_raw)
    }

    fn delete_manager(&self, _manager: CameraManagerHandle) -> Result<()> {
        self.release("manager", "delete_manager")
    }

    fn camera_ids(&self, _manager: CameraManagerHandle) -> Result<Vec<CameraId>> {
        Ok(self.lenses.iter().map(|(id, _)| id.clone()).collect())
    }

    fn lens_facing(&self, _manager: CameraManagerHandle, id: &CameraId) -> Result<LensFacing> {
        self.lenses
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, facing)| *facing)
            .ok_or_else(|| CameraError::Capture(format!("unknown camera {}", id)))
    }

    fn open_device(
        &self,
        _manager: CameraManagerHandle,
        id: &CameraId,
        events: Arc<dyn CaptureEventHandler>,
    ) -> Result<CameraDeviceHandle> {
        let device = self.acquire("device")?;
        self.opened.lock().push(id.clone());
        *self.events.lock() = Some(events);
        Ok(CameraDeviceHandle::from_raw(device))
    }

    fn close_device(&self, _device: CameraDeviceHandle) -> Result<()> {
        self.release("device", "close_device")
    }

    fn create_image_surface(
        &self,
        _image: ExternalImageHandle,
        _width: u32,
        _height: u32,
        queue_depth: u32,
    ) -> Result<ImageSurfaceHandle> {
        *self.queue_depth.lock() = Some(queue_depth);
        self.acquire("image_surface").map(ImageSurfaceHandle::from_raw)
    }

    fn release_image_surface(&self, _surface: ImageSurfaceHandle) -> Result<()> {
        self.release("image_surface", "release_image_surface")
    }

    fn acquire_window(&self, _surface: ImageSurfaceHandle) -> Result<NativeWindowHandle> {
        self.acquire("window").map(NativeWindowHandle::from_raw)
    }

    fn release_window(&self, _window: NativeWindowHandle) -> Result<()> {
        self.release("window", "release_window")
    }

    fn update_latest_image(&self, _surface: ImageSurfaceHandle) -> Result<bool> {
        self.journal.record("camera.update_latest_image");
        self.latches.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn create_preview_request(&self, _device: CameraDeviceHandle) -> Result<CaptureRequestHandle> {
        self.acquire("request").map(CaptureRequestHandle::from_raw)
    }

    fn free_request(&self, _request: CaptureRequestHandle) -> Result<()> {
        self.release("request", "free_request")
    }

    fn create_session_output(&self, _window: NativeWindowHandle) -> Result<SessionOutputHandle> {
        self.acquire("session_output").map(SessionOutputHandle::from_raw)
    }

    fn free_session_output(&self, _output: SessionOutputHandle) -> Result<()> {
        self.release("session_output", "free_session_output")
    }

    fn create_output_container(&self) -> Result<OutputContainerHandle> {
        self.acquire("output_container")
            .map(OutputContainerHandle::from_raw)
    }

    fn add_output(
        &self,
        _container: OutputContainerHandle,
        _output: SessionOutputHandle,
    ) -> Result<()> {
        self.step("add_output")
    }

    fn free_output_container(&self, _container: OutputContainerHandle) -> Result<()> {
        self.release("output_container", "free_output_container")
    }

    fn create_output_target(&self, _window: NativeWindowHandle) -> Result<OutputTargetHandle> {
        self.acquire("output_target").map(OutputTargetHandle::from_raw)
    }

    fn add_target(&self, _request: CaptureRequestHandle, _target: OutputTargetHandle) -> Result<()> {
        self.step("add_target")
    }

    fn free_output_target(&self, _target: OutputTargetHandle) -> Result<()> {
        self.release("output_target", "free_output_target")
    }

    fn create_capture_session(
        &self,
        _device: CameraDeviceHandle,
        _outputs: OutputContainerHandle,
        _events: Arc<dyn CaptureEventHandler>,
    ) -> Result<CaptureSessionHandle> {
        self.acquire("capture_session")
            .map(CaptureSessionHandle::from_raw)
    }

    fn set_repeating_request(
        &self,
        _session: CaptureSessionHandle,
        _request: CaptureRequestHandle,
        _events: Arc<dyn CaptureEventHandler>,
    ) -> Result<()> {
        self.acquire("repeating").map(drop)
    }

    fn stop_repeating(&self, _session: CaptureSessionHandle) -> Result<()> {
        self.release("repeating", "stop_repeating")
    }

    fn close_session(&self, _session: CaptureSessionHandle) -> Result<()> {
        self.release("capture_session", "close_session")
    }
}

// =============================================================================
// Engine
// =============================================================================

pub const ENGINE_CONTEXT: GlContextHandle = GlContextHandle::from_raw(0x1);

#[derive(Default)]
pub struct FakeEngine {
    pub pending: Mutex<Vec<BeforeRenderTask>>,
    pub overrides: Mutex<Vec<(EngineTextureHandle, NativeTextureId)>>,
}

impl FakeEngine {
    /// Run every queued before-render task, as the engine does at the start
    /// of a frame. Returns how many ran.
    pub fn run_before_render(&self) -> usize {
        let tasks: Vec<_> = self.pending.lock().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }
}

impl DeviceContext for FakeEngine {
    fn main_context(&self) -> Option<GlContextHandle> {
        Some(ENGINE_CONTEXT)
    }

    fn before_render(&self, task: BeforeRenderTask) {
        self.pending.lock().push(task);
    }
}

impl TextureRegistry for FakeEngine {
    fn override_backing_store(&self, handle: EngineTextureHandle, native: NativeTextureId) {
        self.overrides.lock().push((handle, native));
    }
}

// =============================================================================
// Permissions / diagnostics
// =============================================================================

pub struct CountingGate {
    pub granted: bool,
    pub asked: AtomicUsize,
}

impl CountingGate {
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            asked: AtomicUsize::new(0),
        }
    }
}

impl PermissionGate for CountingGate {
    fn check_camera_permission(&self) -> BoxFuture<'_, bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        let granted = self.granted;
        Box::pin(async move {
            tokio::task::yield_now().await;
            granted
        })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub teardown: Mutex<Vec<(&'static str, String)>>,
    pub capture: Mutex<Vec<CaptureFailure>>,
}

impl DiagnosticSink for RecordingSink {
    fn teardown_failed(&self, resource: &'static str, error: &CameraError) {
        self.teardown.lock().push((resource, error.to_string()));
    }

    fn capture_failed(&self, failure: &CaptureFailure) {
        self.capture.lock().push(failure.clone());
    }
}

// =============================================================================
// Rig
// =============================================================================

pub struct Rig {
    pub journal: Journal,
    pub egl: Arc<FakeEgl>,
    pub gl: Arc<FakeGl>,
    pub camera: Arc<FakeCamera>,
    pub engine: Arc<FakeEngine>,
    pub gate: Arc<CountingGate>,
    pub sink: Arc<RecordingSink>,
}

/// Route `tracing` output through the test harness. `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl Rig {
    pub fn new() -> Self {
        let journal = Journal::default();
        let camera = FakeCamera::new(journal.clone());
        Self::with_camera(journal, camera)
    }

    pub fn with_camera(journal: Journal, camera: FakeCamera) -> Self {
        init_tracing();
        Self {
            egl: Arc::new(FakeEgl::new(journal.clone())),
            gl: Arc::new(FakeGl::new(journal.clone())),
            camera: Arc::new(camera),
            engine: Arc::new(FakeEngine::default()),
            gate: Arc::new(CountingGate::new(true)),
            sink: Arc::new(RecordingSink::default()),
            journal,
        }
    }

    pub fn deny_permission(mut self) -> Self {
        self.gate = Arc::new(CountingGate::new(false));
        self
    }

    pub fn controller(&self, config: CameraConfig) -> NativeCamera {
        NativeCamera::new(
            config,
            self.egl.clone(),
            self.gl.clone(),
            self.engine.clone(),
            self.engine.clone(),
            self.gate.clone(),
        )
        .with_capture_platform(self.camera.clone())
        .with_diagnostics(self.sink.clone())
    }

    pub fn capture_controller(&self) -> NativeCamera {
        self.controller(CameraConfig::default())
    }

    pub fn override_controller(&self) -> NativeCamera {
        self.controller(CameraConfig::override_mode())
    }

    /// Every GL, EGL and camera handle is released.
    pub fn assert_no_leaks(&self) {
        assert_eq!(self.gl.live_count(), 0, "GL objects leaked");
        assert_eq!(self.egl.live_count(), 0, "EGL contexts leaked");
        assert_eq!(self.camera.outstanding(), 0, "camera handles leaked");
    }
}
