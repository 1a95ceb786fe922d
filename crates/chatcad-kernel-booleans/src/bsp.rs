//! BSP polygon clipping for mesh booleans.
//!
//! Each operand becomes a BSP tree of its faces; clipping one tree against
//! the other discards the polygon fragments inside (or outside) the other
//! solid, and the surviving fragments are reassembled into the result.
//! Inputs are triangles; splitting keeps every fragment convex, so
//! reassembly is a fan per fragment.

use crate::BooleanOp;
use chatcad_kernel_math::{Point3, Vec3};
use chatcad_kernel_mesh::TriMesh;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Debug, Clone)]
struct Plane {
    normal: Vec3,
    w: f64,
}

impl Plane {
    fn from_points(a: &Point3, b: &Point3, c: &Point3) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        let norm = n.norm();
        if norm < 1e-12 {
            return None;
        }
        let normal = n / norm;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Split `polygon` by this plane into the four output bins.
    fn split_polygon(
        &self,
        polygon: &Polygon,
        eps: f64,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = COPLANAR;
        let mut types = Vec::with_capacity(polygon.vertices.len());
        for v in &polygon.vertices {
            let t = self.normal.dot(&v.coords) - self.w;
            let ty = if t < -eps {
                BACK
            } else if t > eps {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= ty;
            types.push(ty);
        }

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let mut f = Vec::new();
                let mut b = Vec::new();
                let n = polygon.vertices.len();
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (&polygon.vertices[i], &polygon.vertices[j]);
                    if ti != BACK {
                        f.push(*vi);
                    }
                    if ti != FRONT {
                        b.push(*vi);
                    }
                    if (ti | tj) == SPANNING {
                        let denom = self.normal.dot(&(vj - vi));
                        let t = (self.w - self.normal.dot(&vi.coords)) / denom;
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon {
                        vertices: f,
                        plane: polygon.plane.clone(),
                    });
                }
                if b.len() >= 3 {
                    back.push(Polygon {
                        vertices: b,
                        plane: polygon.plane.clone(),
                    });
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<Point3>,
    plane: Plane,
}

impl Polygon {
    fn from_triangle(a: Point3, b: Point3, c: Point3) -> Option<Self> {
        Plane::from_points(&a, &b, &c).map(|plane| Self {
            vertices: vec![a, b, c],
            plane,
        })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

#[derive(Debug, Default)]
struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    fn new(polygons: Vec<Polygon>, eps: f64) -> Self {
        let mut node = Self::default();
        node.build(polygons, eps);
        node
    }

    /// Convert solid space to empty space and vice versa.
    fn invert(&mut self) {
        for p in &mut self.polygons {
            p.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` inside this BSP tree's solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>, eps: f64) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            plane.split_polygon(
                polygon,
                eps,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
            front.extend(coplanar_front);
            back.extend(coplanar_back);
        }
        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front, eps),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back, eps),
            // No back subtree: back space is solid, fragments there drop.
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Remove everything in this tree that lies inside `other`'s solid.
    fn clip_to(&mut self, other: &Node, eps: f64) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons), eps);
        if let Some(front) = &mut self.front {
            front.clip_to(other, eps);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other, eps);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = self.polygons.clone();
        if let Some(front) = &self.front {
            out.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.all_polygons());
        }
        out
    }

    /// Insert polygons into the tree, splitting as needed.
    fn build(&mut self, polygons: Vec<Polygon>, eps: f64) {
        if polygons.is_empty() {
            return;
        }
        let plane = match &self.plane {
            Some(p) => p.clone(),
            None => {
                let p = polygons[0].plane.clone();
                self.plane = Some(p.clone());
                p
            }
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for polygon in &polygons {
            plane.split_polygon(
                polygon,
                eps,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
        }
        self.polygons.extend(coplanar_front);
        self.polygons.extend(coplanar_back);
        if !front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(front, eps);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(back, eps);
        }
    }
}

fn mesh_to_polygons(mesh: &TriMesh) -> Vec<Polygon> {
    (0..mesh.num_triangles())
        .filter_map(|t| {
            let [a, b, c] = mesh.triangle(t);
            Polygon::from_triangle(a, b, c)
        })
        .collect()
}

fn polygons_to_mesh(polygons: &[Polygon]) -> TriMesh {
    let mut mesh = TriMesh::new();
    for polygon in polygons {
        if polygon.vertices.len() < 3 {
            continue;
        }
        let base = mesh.push_vertex(polygon.vertices[0]);
        let mut prev = mesh.push_vertex(polygon.vertices[1]);
        for v in &polygon.vertices[2..] {
            let next = mesh.push_vertex(*v);
            mesh.push_triangle(base, prev, next);
            prev = next;
        }
    }
    mesh
}

/// Run the BSP clip pipeline for `op` on two closed meshes.
pub(crate) fn clip_boolean(a: &TriMesh, b: &TriMesh, op: BooleanOp, eps: f64) -> TriMesh {
    let mut na = Node::new(mesh_to_polygons(a), eps);
    let mut nb = Node::new(mesh_to_polygons(b), eps);

    match op {
        BooleanOp::Union => {
            na.clip_to(&nb, eps);
            nb.clip_to(&na, eps);
            nb.invert();
            nb.clip_to(&na, eps);
            nb.invert();
            na.build(nb.all_polygons(), eps);
        }
        BooleanOp::Difference => {
            na.invert();
            na.clip_to(&nb, eps);
            nb.clip_to(&na, eps);
            nb.invert();
            nb.clip_to(&na, eps);
            nb.invert();
            na.build(nb.all_polygons(), eps);
            na.invert();
        }
        BooleanOp::Intersection => {
            na.invert();
            nb.clip_to(&na, eps);
            nb.invert();
            na.clip_to(&nb, eps);
            nb.clip_to(&na, eps);
            na.build(nb.all_polygons(), eps);
            na.invert();
        }
    }

    polygons_to_mesh(&na.all_polygons())
}
