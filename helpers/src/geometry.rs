use approx::ulps_eq;

// 2D ----------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct Vector2d {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2d {
    pub fn sub(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
        }
    }
    pub fn add(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
        }
    }
    pub fn mult(&self, k: f64) -> Vector2d {
        Vector2d {
            dx: self.dx * k,
            dy: self.dy * k,
        }
    }
    pub fn abs(&self) -> f64 {
        (self.dx.powf(2.0) + self.dy.powf(2.0)).sqrt()
    }
    /// angle returns the direction of the vector in the range (-pi, pi] (measured from the
    /// positive x axis).
    pub fn angle(&self) -> f64 {
        self.dy.atan2(self.dx)
    }
    pub fn normalized(&self) -> Vector2d {
        self.mult(1.0 / self.abs())
    }
}

impl PartialEq for Vector2d {
    fn eq(&self, other: &Self) -> bool {
        ulps_eq!(self.dx, other.dx) && ulps_eq!(self.dy, other.dy)
    }
}

// 3D ----------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub fn as_vector3d(&self) -> Vector3d {
        Vector3d {
            dx: self.x,
            dy: self.y,
            dz: self.z,
        }
    }
    /// dist_to returns the Euclidean distance between the two points.
    pub fn dist_to(&self, other: &Point3d) -> f64 {
        self.as_vector3d().sub(&other.as_vector3d()).abs()
    }
}

#[derive(Debug, Clone)]
pub struct Vector3d {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector3d {
    pub fn sub(&self, other: &Self) -> Vector3d {
        Vector3d {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
            dz: self.dz - other.dz,
        }
    }
    pub fn abs(&self) -> f64 {
        (self.dx.powf(2.0) + self.dy.powf(2.0) + self.dz.powf(2.0)).sqrt()
    }
}
