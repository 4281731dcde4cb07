use crate::driver::{check_error, DriverFault, GraphicsDriver, ProgramId, ShaderId, ShaderStage};

use super::error::ShaderError;

/// Compiles shader stages and links them into programs on one driver.
///
/// Failures are logged at the point they are detected and returned as
/// [`ShaderError`]. Only [`ShaderError::Driver`] is fatal; compile and link
/// errors leave the driver in a clean state.
pub struct ShaderProgramBuilder<'a, D: ?Sized> {
    gl: &'a D,
}

impl<'a, D> ShaderProgramBuilder<'a, D>
where
    D: GraphicsDriver + ?Sized,
{
    pub fn new(gl: &'a D) -> Self {
        Self { gl }
    }

    /// Creates, sources and compiles one stage.
    ///
    /// On a compile error the shader object is deleted before returning.
    pub fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<ShaderId, ShaderError> {
        if source.trim().is_empty() {
            log::error!("refusing to compile empty {stage} shader");
            return Err(ShaderError::EmptySource(stage));
        }

        let Some(shader) = self.gl.create_shader(stage) else {
            log::error!("could not create {stage} shader object");
            return Err(ShaderError::ShaderCreateFailed(stage));
        };

        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);

        if !self.gl.shader_compile_status(shader) {
            let log = self.gl.shader_info_log(shader);
            log::error!("could not compile {stage} shader:");
            log::error!("{}", log.trim_end());
            self.gl.delete_shader(shader);
            return Err(ShaderError::Compile { stage, log });
        }

        log::debug!("compiled {stage} shader {}", shader.0);
        Ok(shader)
    }

    /// Attaches two compiled stages to a new program and links it.
    ///
    /// Every attach is followed by an error check; a pending driver error
    /// aborts with [`ShaderError::Driver`]. A program that fails to link is
    /// deleted. The stages themselves are left to the caller.
    pub fn link_program(&self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, ShaderError> {
        let Some(program) = self.gl.create_program() else {
            log::error!("could not create program object");
            return Err(ShaderError::ProgramCreateFailed);
        };

        let attached = self.attach(program, vertex).and_then(|()| self.attach(program, fragment));
        if let Err(fault) = attached {
            self.gl.delete_program(program);
            return Err(fault.into());
        }

        self.gl.link_program(program);

        if !self.gl.program_link_status(program) {
            let log = self.gl.program_info_log(program);
            log::error!("could not link program:");
            log::error!("{}", log.trim_end());
            self.gl.delete_program(program);
            return Err(ShaderError::Link { log });
        }

        log::debug!("linked program {}", program.0);
        Ok(program)
    }

    /// compile(vertex) → compile(fragment) → link, stopping at the first failure.
    ///
    /// No program object is created unless both stages compile. Stage objects
    /// are released once the outcome is known; a linked program keeps its
    /// attached stages alive on the driver side.
    pub fn create_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramId, ShaderError> {
        let vertex = self.compile_stage(ShaderStage::Vertex, vertex_source)?;

        let fragment = match self.compile_stage(ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                self.gl.delete_shader(vertex);
                return Err(e);
            }
        };

        let linked = self.link_program(vertex, fragment);

        self.gl.delete_shader(vertex);
        self.gl.delete_shader(fragment);

        linked
    }

    fn attach(&self, program: ProgramId, shader: ShaderId) -> Result<(), DriverFault> {
        self.gl.attach_shader(program, shader);
        check_error(self.gl, "glAttachShader")
    }
}
