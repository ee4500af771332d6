use cgmath::{Deg, InnerSpace, Matrix3, Matrix4, Point3, Vector3};
use wgpu::util::DeviceExt;
use winit::event::*;

/// Free-flying viewer: walks along the view direction and swings the
/// target point around the up axis. Frame timing is owned by the loop;
/// the camera only sees elapsed seconds.
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub speed: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) -> Self {
        Self {
            position,
            target,
            up,
            speed: 0.05,
            rotation_speed: 3.0,
        }
    }

    /// Advance position while forward/backward are held and rotate the
    /// target around the up axis while the rotate keys are held, both
    /// scaled by `dt` seconds.
    pub fn update(&mut self, input: &CameraController, dt: f32) {
        if input.is_forward_pressed {
            let direction = (self.target - self.position).normalize();
            self.position += direction * self.speed * dt;
        }
        if input.is_backward_pressed {
            let direction = (self.target - self.position).normalize();
            self.position -= direction * self.speed * dt;
        }
        if input.is_rotate_left_pressed {
            self.rotate_target(Deg(self.rotation_speed * dt));
        }
        if input.is_rotate_right_pressed {
            self.rotate_target(Deg(-self.rotation_speed * dt));
        }
    }

    /// Look-at transform from position toward target. Pure.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    fn rotate_target(&mut self, angle: Deg<f32>) {
        let rotation = Matrix3::from_axis_angle(self.up.normalize(), angle);
        self.target = self.position + rotation * (self.target - self.position);
    }
}

/// Combined view-projection for the vertex stage plus a placeholder
/// light position the shader declares but does not yet light with.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    light_pos: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
            light_pos: [5.0, 5.0, 5.0, 1.0],
        }
    }

    pub fn set_view_proj(&mut self, view_proj: Matrix4<f32>) {
        self.view_proj = view_proj.into();
    }

    pub fn to_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(self),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, buffer: &wgpu::Buffer, queue: &wgpu::Queue) {
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(self));
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Latched held-key state for the four movement keys. The quit key is
/// handled by the event loop, not here.
pub struct CameraController {
    is_forward_pressed: bool,
    is_backward_pressed: bool,
    is_rotate_left_pressed: bool,
    is_rotate_right_pressed: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            is_forward_pressed: false,
            is_backward_pressed: false,
            is_rotate_left_pressed: false,
            is_rotate_right_pressed: false,
        }
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => {
                let is_pressed = *state == ElementState::Pressed;
                match keycode {
                    VirtualKeyCode::W | VirtualKeyCode::Up => {
                        self.is_forward_pressed = is_pressed;
                        true
                    }
                    VirtualKeyCode::S | VirtualKeyCode::Down => {
                        self.is_backward_pressed = is_pressed;
                        true
                    }
                    VirtualKeyCode::A | VirtualKeyCode::Left => {
                        self.is_rotate_left_pressed = is_pressed;
                        true
                    }
                    VirtualKeyCode::D | VirtualKeyCode::Right => {
                        self.is_rotate_right_pressed = is_pressed;
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::MetricSpace;

    fn test_camera() -> Camera {
        Camera::new(
            Point3::new(0.5, 0.4, 0.5),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, 0.0),
        )
    }

    fn held(forward: bool, backward: bool, left: bool, right: bool) -> CameraController {
        CameraController {
            is_forward_pressed: forward,
            is_backward_pressed: backward,
            is_rotate_left_pressed: left,
            is_rotate_right_pressed: right,
        }
    }

    #[test]
    fn no_input_zero_dt_is_idempotent() {
        let mut camera = test_camera();
        let idle = held(false, false, false, false);
        let (position, target) = (camera.position, camera.target);
        camera.update(&idle, 0.0);
        camera.update(&idle, 0.0);
        assert_eq!(camera.position, position);
        assert_eq!(camera.target, target);
    }

    #[test]
    fn forward_moves_along_view_direction() {
        let mut camera = test_camera();
        let direction = (camera.target - camera.position).normalize();
        let start = camera.position;
        camera.update(&held(true, false, false, false), 2.0);
        let moved = camera.position - start;
        assert!((moved - direction * 0.05 * 2.0).magnitude() < 1e-6);
    }

    #[test]
    fn rotate_left_preserves_distance_and_rotates_by_speed_times_dt() {
        let mut camera = test_camera();
        let before = camera.target - camera.position;
        let start_position = camera.position;
        let dt = 1.5;
        camera.update(&held(false, false, true, false), dt);
        let after = camera.target - camera.position;

        assert_eq!(camera.position, start_position);
        assert!((before.magnitude() - after.magnitude()).abs() < 1e-5);

        let cos_angle = before.normalize().dot(after.normalize());
        let angle = cos_angle.min(1.0).max(-1.0).acos().to_degrees();
        assert!((angle - camera.rotation_speed * dt).abs() < 1e-3);
    }

    #[test]
    fn rotate_right_is_inverse_of_rotate_left() {
        let mut camera = test_camera();
        let original_target = camera.target;
        camera.update(&held(false, false, true, false), 1.0);
        camera.update(&held(false, false, false, true), 1.0);
        assert!(camera.target.distance(original_target) < 1e-5);
    }
}
