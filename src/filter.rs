// src/filter.rs - Constant-velocity Kalman filter for tracked positions
use nalgebra::{Matrix3, Matrix3x6, Matrix6, Vector3, Vector6};

pub struct KalmanFilter {
    state: Vector6<f64>, // [x, y, z, vx, vy, vz]
    covariance: Matrix6<f64>,
    process_noise: Matrix6<f64>,
    measurement_noise: Matrix3<f64>,
    dt: f64,
    initialized: bool,
}

impl KalmanFilter {
    pub fn new(dt: f64) -> Self {
        let mut process_noise = Matrix6::identity() * 0.1;
        process_noise.fixed_view_mut::<3, 3>(3, 3).fill_diagonal(0.2);

        Self {
            state: Vector6::zeros(),
            covariance: Matrix6::identity(),
            process_noise,
            measurement_noise: Matrix3::identity() * 0.1,
            dt,
            initialized: false,
        }
    }

    pub fn predict(&mut self) {
        let mut f = Matrix6::identity();
        f.fixed_view_mut::<3, 3>(0, 3).fill_diagonal(self.dt);

        self.state = f * self.state;
        self.covariance = f * self.covariance * f.transpose() + self.process_noise;
    }

    pub fn update(&mut self, measurement: Vector3<f64>) {
        // The first measurement seeds the state instead of pulling it from the origin
        if !self.initialized {
            self.state.fixed_rows_mut::<3>(0).copy_from(&measurement);
            self.initialized = true;
            return;
        }

        // Observes position only
        let mut h = Matrix3x6::<f64>::zeros();
        h[(0, 0)] = 1.0;
        h[(1, 1)] = 1.0;
        h[(2, 2)] = 1.0;

        let innovation = measurement - (h * self.state);
        let s = h * self.covariance * h.transpose() + self.measurement_noise;

        let Some(s_inv) = s.try_inverse() else {
            tracing::warn!("Singular innovation covariance, skipping Kalman update");
            return;
        };
        let k = self.covariance * h.transpose() * s_inv;

        self.state += k * innovation;
        self.covariance = (Matrix6::identity() - k * h) * self.covariance;
    }

    /// Predict then correct with `measurement`, returning the filtered position.
    pub fn step(&mut self, measurement: Vector3<f64>) -> Vector3<f64> {
        if self.initialized {
            self.predict();
        }
        self.update(measurement);
        self.position()
    }

    pub fn reset(&mut self) {
        self.state = Vector6::zeros();
        self.covariance = Matrix6::identity();
        self.initialized = false;
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.state[0], self.state[1], self.state[2])
    }
}
