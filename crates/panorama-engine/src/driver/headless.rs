use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU32;

use super::api::GraphicsDriver;
use super::types::{
    AttribLocation, BufferId, ClearMask, ErrorCode, ProgramId, ShaderId, ShaderStage, VertexLayout,
};

/// One recorded driver call.
///
/// Status and info-log queries are not recorded; they never change driver state.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    CreateShader(ShaderStage, ShaderId),
    ShaderSource(ShaderId),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    AttachShader(ProgramId, ShaderId),
    LinkProgram(ProgramId),
    DeleteProgram(ProgramId),
    AttribLocation(ProgramId, String),
    CreateBuffer(BufferId, usize),
    DeleteBuffer(BufferId),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear(ClearMask),
    UseProgram(Option<ProgramId>),
    EnableAttrib(AttribLocation),
    DisableAttrib(AttribLocation),
    AttribPointer(AttribLocation, BufferId, VertexLayout),
    DrawTriangles { first: i32, count: i32 },
}

/// In-process driver that records every call and emulates GL object rules.
///
/// "Compilation" is a light GLSL sanity pass: the source must be non-empty,
/// have balanced delimiters, terminate every statement, and define
/// `void main`. Linking requires one compiled stage of each kind and a vertex
/// stage that writes `gl_Position`. Attribute locations are assigned in
/// declaration order. Misuse raises GL error flags the same way a real
/// driver would, and extra flags can be injected with [`inject_error`].
///
/// [`inject_error`]: HeadlessDriver::inject_error
#[derive(Debug, Default)]
pub struct HeadlessDriver {
    state: RefCell<State>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    shaders: HashMap<ShaderId, ShaderObject>,
    programs: HashMap<ProgramId, ProgramObject>,
    buffers: HashMap<BufferId, Vec<u8>>,
    errors: VecDeque<ErrorCode>,
    calls: Vec<DriverCall>,
    refuse_objects: bool,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    /// `Ok` carries the declared vertex attributes.
    compiled: Option<Result<Vec<String>, String>>,
    delete_pending: bool,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<ShaderId>,
    /// `Ok` carries attribute names in location order.
    linked: Option<Result<Vec<String>, String>>,
}

impl State {
    fn alloc(&mut self) -> NonZeroU32 {
        let id = NonZeroU32::MIN.saturating_add(self.next_id);
        self.next_id += 1;
        id
    }

    fn raise(&mut self, code: ErrorCode) {
        self.errors.push_back(code);
    }

    fn is_attached(&self, shader: ShaderId) -> bool {
        self.programs.values().any(|p| p.attached.contains(&shader))
    }

    /// Drops shaders flagged for deletion that no program references anymore.
    fn collect_shaders(&mut self) {
        let doomed: Vec<ShaderId> = self
            .shaders
            .iter()
            .filter(|(id, s)| s.delete_pending && !self.is_attached(**id))
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            self.shaders.remove(&id);
        }
    }

    fn linked_attributes(&self, program: ProgramId) -> Result<&[String], ErrorCode> {
        match self.programs.get(&program) {
            None => Err(ErrorCode::INVALID_VALUE),
            Some(ProgramObject { linked: Some(Ok(attrs)), .. }) => Ok(attrs),
            Some(_) => Err(ErrorCode::INVALID_OPERATION),
        }
    }

    fn link(&self, program: &ProgramObject) -> Result<Vec<String>, String> {
        let mut vertex = None;
        let mut fragment = None;

        for id in &program.attached {
            let Some(shader) = self.shaders.get(id) else { continue };
            let attrs = match &shader.compiled {
                Some(Ok(attrs)) => attrs,
                _ => return Err(format!("error: {} shader is not compiled", shader.stage)),
            };
            match shader.stage {
                ShaderStage::Vertex => vertex = Some((shader, attrs)),
                ShaderStage::Fragment => fragment = Some(shader),
            }
        }

        let Some((vertex, attrs)) = vertex else {
            return Err("error: no vertex shader attached".to_string());
        };
        if fragment.is_none() {
            return Err("error: no fragment shader attached".to_string());
        }
        if !identifiers(&strip_comments(&vertex.source)).any(|t| t == "gl_Position") {
            return Err("error: vertex shader does not write gl_Position".to_string());
        }

        Ok(attrs.clone())
    }
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, oldest first.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn count_calls(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// `(first, count)` of every triangle draw, oldest first.
    pub fn draw_calls(&self) -> Vec<(i32, i32)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                DriverCall::DrawTriangles { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Shaders that exist and are not flagged for deletion.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.values().filter(|s| !s.delete_pending).count()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn buffer_data(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Queues an error flag, as if a previous call had failed.
    pub fn inject_error(&self, code: ErrorCode) {
        self.state.borrow_mut().raise(code);
    }

    /// Makes every `create_*` call return no object (out-of-resources emulation).
    pub fn refuse_object_creation(&self, refuse: bool) {
        self.state.borrow_mut().refuse_objects = refuse;
    }

    fn record(&self, call: DriverCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsDriver for HeadlessDriver {
    fn create_shader(&self, stage: ShaderStage) -> Option<ShaderId> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if st.refuse_objects {
            return None;
        }
        let id = ShaderId(st.alloc());
        st.shaders.insert(
            id,
            ShaderObject { stage, source: String::new(), compiled: None, delete_pending: false },
        );
        st.calls.push(DriverCall::CreateShader(stage, id));
        Some(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        self.record(DriverCall::ShaderSource(shader));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        match st.shaders.get_mut(&shader) {
            Some(s) => s.source = source.to_string(),
            None => st.raise(ErrorCode::INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        self.record(DriverCall::CompileShader(shader));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        match st.shaders.get_mut(&shader) {
            Some(s) => s.compiled = Some(check_glsl(s.stage, &s.source)),
            None => st.raise(ErrorCode::INVALID_VALUE),
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        matches!(
            self.state.borrow().shaders.get(&shader),
            Some(ShaderObject { compiled: Some(Ok(_)), .. })
        )
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        match self.state.borrow().shaders.get(&shader) {
            Some(ShaderObject { compiled: Some(Err(log)), .. }) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.record(DriverCall::DeleteShader(shader));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        match st.shaders.get_mut(&shader) {
            Some(s) => s.delete_pending = true,
            None => st.raise(ErrorCode::INVALID_VALUE),
        }
        st.collect_shaders();
    }

    fn create_program(&self) -> Option<ProgramId> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if st.refuse_objects {
            return None;
        }
        let id = ProgramId(st.alloc());
        st.programs.insert(id, ProgramObject::default());
        st.calls.push(DriverCall::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(DriverCall::AttachShader(program, shader));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if !st.shaders.contains_key(&shader) {
            st.raise(ErrorCode::INVALID_VALUE);
            return;
        }
        let Some(p) = st.programs.get_mut(&program) else {
            st.raise(ErrorCode::INVALID_VALUE);
            return;
        };
        if p.attached.contains(&shader) {
            st.raise(ErrorCode::INVALID_OPERATION);
        } else {
            p.attached.push(shader);
        }
    }

    fn link_program(&self, program: ProgramId) {
        self.record(DriverCall::LinkProgram(program));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let Some(p) = st.programs.get(&program) else {
            st.raise(ErrorCode::INVALID_VALUE);
            return;
        };
        let result = st.link(p);
        if let Some(p) = st.programs.get_mut(&program) {
            p.linked = Some(result);
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        matches!(
            self.state.borrow().programs.get(&program),
            Some(ProgramObject { linked: Some(Ok(_)), .. })
        )
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        match self.state.borrow().programs.get(&program) {
            Some(ProgramObject { linked: Some(Err(log)), .. }) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_program(&self, program: ProgramId) {
        self.record(DriverCall::DeleteProgram(program));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if st.programs.remove(&program).is_none() {
            st.raise(ErrorCode::INVALID_VALUE);
        }
        st.collect_shaders();
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        self.record(DriverCall::AttribLocation(program, name.to_string()));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let found = match st.linked_attributes(program) {
            Ok(attrs) => attrs.iter().position(|a| a == name),
            Err(code) => {
                st.raise(code);
                return None;
            }
        };
        found.and_then(|i| u32::try_from(i).ok()).map(AttribLocation)
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Option<BufferId> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if st.refuse_objects {
            return None;
        }
        let id = BufferId(st.alloc());
        st.buffers.insert(id, data.to_vec());
        st.calls.push(DriverCall::CreateBuffer(id, data.len()));
        Some(id)
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.record(DriverCall::DeleteBuffer(buffer));
        // Deleting an unknown buffer name is silently ignored by GL.
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(DriverCall::Viewport(x, y, width, height));
        if width < 0 || height < 0 {
            self.state.borrow_mut().raise(ErrorCode::INVALID_VALUE);
        }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(DriverCall::ClearColor(rgba));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(DriverCall::Clear(mask));
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(DriverCall::UseProgram(program));
        let Some(program) = program else { return };
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if let Err(code) = st.linked_attributes(program) {
            st.raise(code);
        }
    }

    fn enable_vertex_attrib_array(&self, location: AttribLocation) {
        self.record(DriverCall::EnableAttrib(location));
    }

    fn disable_vertex_attrib_array(&self, location: AttribLocation) {
        self.record(DriverCall::DisableAttrib(location));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: AttribLocation,
        buffer: BufferId,
        layout: VertexLayout,
    ) {
        self.record(DriverCall::AttribPointer(location, buffer, layout));
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        if !(1..=4).contains(&layout.components) || layout.stride < 0 {
            st.raise(ErrorCode::INVALID_VALUE);
        } else if !st.buffers.contains_key(&buffer) {
            st.raise(ErrorCode::INVALID_OPERATION);
        }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(DriverCall::DrawTriangles { first, count });
        if first < 0 || count < 0 {
            self.state.borrow_mut().raise(ErrorCode::INVALID_VALUE);
        }
    }

    fn get_error(&self) -> Option<ErrorCode> {
        self.state.borrow_mut().errors.pop_front()
    }
}

// ── GLSL sanity pass ──────────────────────────────────────────────────────

/// Removes `//` comments and preprocessor lines, keeping line numbering.
fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| {
            let code = line.split("//").next().unwrap_or("");
            if code.trim_start().starts_with('#') { "" } else { code }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn identifiers(source: &str) -> impl Iterator<Item = &str> {
    source
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

/// Returns declared `attribute` names on success, an info log on failure.
fn check_glsl(stage: ShaderStage, source: &str) -> Result<Vec<String>, String> {
    let code = strip_comments(source);
    if code.trim().is_empty() {
        return Err("ERROR: 0:1: '' : empty shader source".to_string());
    }

    let mut open: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    // Text since the last statement or block boundary.
    let mut pending = String::new();

    for ch in code.chars() {
        match ch {
            '\n' => line += 1,
            '(' | '[' | '{' => open.push((ch, line)),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match open.pop() {
                    Some((c, _)) if c == expected => {}
                    _ => return Err(format!("ERROR: 0:{line}: '{ch}' : syntax error")),
                }
                if ch == '}' && !pending.trim().is_empty() {
                    return Err(format!(
                        "ERROR: 0:{line}: '}}' : syntax error, expected ';' after '{}'",
                        pending.trim()
                    ));
                }
            }
            _ => {}
        }
        match ch {
            ';' | '{' | '}' => pending.clear(),
            _ => pending.push(ch),
        }
    }

    if let Some((c, l)) = open.pop() {
        return Err(format!("ERROR: 0:{l}: '{c}' : unmatched delimiter"));
    }
    if !pending.trim().is_empty() {
        return Err(format!("ERROR: 0:{line}: '' : syntax error, unexpected end of file"));
    }

    let tokens: Vec<&str> = identifiers(&code).collect();
    if !tokens.windows(2).any(|w| w == ["void", "main"]) {
        return Err("ERROR: 0:1: 'main' : function not defined".to_string());
    }

    let attributes: Vec<String> = code
        .split(';')
        .filter_map(|stmt| {
            let words: Vec<&str> = stmt.split_whitespace().collect();
            match words.as_slice() {
                ["attribute", .., name] if words.len() >= 3 => Some(name.to_string()),
                _ => None,
            }
        })
        .collect();

    if stage == ShaderStage::Fragment && !attributes.is_empty() {
        return Err(
            "ERROR: 0:1: 'attribute' : supported in vertex shaders only".to_string(),
        );
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "attribute vec4 aPosition; void main(){gl_Position=aPosition;}";
    const FS: &str = "precision mediump float; void main(){gl_FragColor=vec4(0,0.5,0.5,1);}";

    // ── glsl check ────────────────────────────────────────────────────────

    #[test]
    fn accepts_minimal_stages() {
        assert_eq!(check_glsl(ShaderStage::Vertex, VS), Ok(vec!["aPosition".to_string()]));
        assert_eq!(check_glsl(ShaderStage::Fragment, FS), Ok(vec![]));
    }

    #[test]
    fn rejects_missing_semicolon() {
        let err = check_glsl(
            ShaderStage::Fragment,
            "void main(){gl_FragColor=vec4(0,0.5,0.5,1)}",
        )
        .unwrap_err();
        assert!(err.contains("expected ';'"), "{err}");
    }

    #[test]
    fn rejects_unbalanced_delimiters() {
        assert!(check_glsl(ShaderStage::Vertex, "void main(){gl_Position=vec4(0.0;}").is_err());
        assert!(check_glsl(ShaderStage::Vertex, "void main(){gl_Position=vec4(0.0);").is_err());
    }

    #[test]
    fn rejects_missing_entry_point() {
        let err = check_glsl(ShaderStage::Vertex, "void run(){gl_Position=vec4(0.0);}").unwrap_err();
        assert!(err.contains("main"), "{err}");
    }

    #[test]
    fn ignores_comments_and_version_lines() {
        let src = "#version 100\n// entry\nattribute vec4 a_pos; // input\nvoid main() {\n  gl_Position = a_pos; // out\n}\n";
        assert_eq!(check_glsl(ShaderStage::Vertex, src), Ok(vec!["a_pos".to_string()]));
    }

    #[test]
    fn error_reports_line_number() {
        let err = check_glsl(ShaderStage::Fragment, "void main() {\n  gl_FragColor = vec4(1.0)\n}").unwrap_err();
        assert!(err.starts_with("ERROR: 0:3:"), "{err}");
    }

    #[test]
    fn attributes_in_fragment_stage_are_rejected() {
        assert!(check_glsl(ShaderStage::Fragment, VS).is_err());
    }

    // ── object rules ──────────────────────────────────────────────────────

    fn compiled(gl: &HeadlessDriver, stage: ShaderStage, src: &str) -> ShaderId {
        let id = gl.create_shader(stage).unwrap();
        gl.shader_source(id, src);
        gl.compile_shader(id);
        id
    }

    #[test]
    fn links_and_assigns_locations_in_declaration_order() {
        let gl = HeadlessDriver::new();
        let vs = compiled(
            &gl,
            ShaderStage::Vertex,
            "attribute vec4 aPosition; attribute vec2 aUv; void main(){gl_Position=aPosition;}",
        );
        let fs = compiled(&gl, ShaderStage::Fragment, FS);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, fs);
        gl.link_program(p);

        assert!(gl.program_link_status(p));
        assert_eq!(gl.attrib_location(p, "aUv"), Some(AttribLocation(1)));
        assert_eq!(gl.attrib_location(p, "missing"), None);
        assert_eq!(gl.get_error(), None);
    }

    #[test]
    fn link_requires_gl_position() {
        let gl = HeadlessDriver::new();
        let vs = compiled(&gl, ShaderStage::Vertex, "attribute vec4 a; void main(){vec4 b=a;}");
        let fs = compiled(&gl, ShaderStage::Fragment, FS);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, fs);
        gl.link_program(p);

        assert!(!gl.program_link_status(p));
        assert!(gl.program_info_log(p).contains("gl_Position"));
    }

    #[test]
    fn attaching_twice_raises_invalid_operation() {
        let gl = HeadlessDriver::new();
        let vs = compiled(&gl, ShaderStage::Vertex, VS);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, vs);
        assert_eq!(gl.get_error(), Some(ErrorCode::INVALID_OPERATION));
    }

    #[test]
    fn flagged_shader_lives_until_program_is_deleted() {
        let gl = HeadlessDriver::new();
        let vs = compiled(&gl, ShaderStage::Vertex, VS);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.delete_shader(vs);

        assert_eq!(gl.live_shaders(), 0);
        assert!(gl.shader_compile_status(vs));

        gl.delete_program(p);
        assert!(!gl.shader_compile_status(vs));
    }

    #[test]
    fn lookup_on_unlinked_program_raises() {
        let gl = HeadlessDriver::new();
        let p = gl.create_program().unwrap();
        assert_eq!(gl.attrib_location(p, "aPosition"), None);
        assert_eq!(gl.get_error(), Some(ErrorCode::INVALID_OPERATION));
    }

    #[test]
    fn refused_creation_returns_none() {
        let gl = HeadlessDriver::new();
        gl.refuse_object_creation(true);
        assert!(gl.create_shader(ShaderStage::Vertex).is_none());
        assert!(gl.create_program().is_none());
        assert!(gl.create_vertex_buffer(&[0; 4]).is_none());
        assert!(gl.calls().is_empty());
    }
}
